use std::collections::BTreeMap;
use std::marker::PhantomData;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque reference to an object owned by the host (an agent, a navigation target, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Handle(pub u64);

/// A value stored in a blackboard slot.
///
/// Equality is by value: two slots compare equal when they hold the same variant with equal
/// contents. Numbers of different variants (`Int(5)` and `Float(5.0)`) are not equal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Handle(Handle),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Vec2(_) => "vec2",
            Value::Vec3(_) => "vec3",
            Value::Handle(_) => "handle",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Conversion between Rust types and blackboard [`Value`]s.
pub trait BlackboardValue: Sized + 'static {
    fn into_value(self) -> Value;
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_blackboard_value {
    ($ty:ty, $variant:ident) => {
        impl BlackboardValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

impl_blackboard_value!(bool, Bool);
impl_blackboard_value!(i64, Int);
impl_blackboard_value!(f64, Float);
impl_blackboard_value!(String, Text);
impl_blackboard_value!([f32; 2], Vec2);
impl_blackboard_value!([f32; 3], Vec3);
impl_blackboard_value!(Handle, Handle);

impl BlackboardValue for i32 {
    fn into_value(self) -> Value {
        Value::Int(self as i64)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl BlackboardValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(self as f64)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v as f32),
            _ => None,
        }
    }
}

impl BlackboardValue for Value {
    fn into_value(self) -> Value {
        self
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

/// A named, typed blackboard key.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BbKey<T: 'static> {
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Copy for BbKey<T> {}

impl<T: 'static> Clone for BbKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> BbKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _phantom: PhantomData,
        }
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

/// Declares a key on a tree template, optionally with a default value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeyDecl {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub default: Option<Value>,
}

impl KeyDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, value: impl BlackboardValue) -> Self {
        self.default = Some(value.into_value());
        self
    }
}

/// Right-hand side of a [`PropertyPair`]: a literal, or the name of another key.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PairValue {
    Literal(Value),
    Key(String),
}

/// Binds a destination key to a source value, for copy and compare nodes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PropertyPair {
    pub key: String,
    pub value: PairValue,
}

impl PropertyPair {
    pub fn literal(key: impl Into<String>, value: impl BlackboardValue) -> Self {
        Self {
            key: key.into(),
            value: PairValue::Literal(value.into_value()),
        }
    }

    pub fn keys(key: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: PairValue::Key(source.into()),
        }
    }
}

/// Key/value store scoped to one tree instance.
///
/// Lookups never fail loudly: an undeclared key, or a key holding a value of another type,
/// reads as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blackboard {
    values: BTreeMap<String, Value>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a blackboard holding the defaults of `decls`. Keys without a default stay unset.
    pub fn from_decls<'a>(decls: impl IntoIterator<Item = &'a KeyDecl>) -> Self {
        let mut bb = Self::new();
        for decl in decls {
            if let Some(default) = &decl.default {
                bb.values.insert(decl.name.clone(), default.clone());
            }
        }
        bb
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn set<T: BlackboardValue>(&mut self, key: BbKey<T>, value: T) {
        self.values.insert(key.name.to_owned(), value.into_value());
    }

    pub fn get<T: BlackboardValue>(&self, key: BbKey<T>) -> Option<T> {
        let value = self.values.get(key.name)?;
        let typed = T::from_value(value);
        if typed.is_none() {
            tracing::trace!(
                key = key.name,
                stored = value.type_name(),
                "blackboard type mismatch"
            );
        }
        typed
    }

    pub fn remove<T: BlackboardValue>(&mut self, key: BbKey<T>) -> Option<T> {
        let value = self.values.remove(key.name)?;
        T::from_value(&value)
    }

    pub fn set_value(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(name.into(), value)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn remove_value(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    /// Resolves the right-hand side of a pair: literals as-is, key references by lookup.
    pub fn resolve(&self, value: &PairValue) -> Option<Value> {
        match value {
            PairValue::Literal(v) => Some(v.clone()),
            PairValue::Key(name) => self.values.get(name).cloned(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
