use thiserror::Error;

/// Errors raised while building or binding a tree. Runtime problems never surface here; they
/// degrade to `Status::Failure` instead.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("unknown tree asset `{0}`")]
    UnknownAsset(String),

    #[error("unknown node kind `{0}`")]
    UnknownNodeKind(String),

    #[error("sub-tree cycle: {}", .0.join(" -> "))]
    SubtreeCycle(Vec<String>),

    #[error("sub-tree nesting exceeds the depth limit of {limit}")]
    DepthLimit { limit: usize },

    #[error("invalid `{param}` on {node} node: {reason}")]
    InvalidParameter {
        node: &'static str,
        param: &'static str,
        reason: String,
    },

    #[error("invalid params for custom node `{kind}`: {reason}")]
    InvalidCustomParams { kind: String, reason: String },
}
