//! Builder utilities for ergonomic tree construction.
//!
//! Instead of writing `Node::new(Sequence::new(vec![...]))`, use `sequence(vec![...])`.

use bt_core::{Blackboard, Host, PropertyPair, TickContext};

use crate::{
    Breakpoint, CompareProperty, Condition, Fail, Inverter, Log, Node, Parallel, RandomFailure,
    RandomSelector, ReactiveSelector, ReactiveSequence, Repeat, Selector, Sequence, SetProperty,
    SubTree, Succeed, Timeout, Tree, Wait,
};

#[inline]
pub fn sequence<C: Host>(children: Vec<Node<C>>) -> Node<C> {
    Node::new(Sequence::new(children))
}

#[inline]
pub fn selector<C: Host>(children: Vec<Node<C>>) -> Node<C> {
    Node::new(Selector::new(children))
}

#[inline]
pub fn reactive_sequence<C: Host>(children: Vec<Node<C>>) -> Node<C> {
    Node::new(ReactiveSequence::new(children))
}

#[inline]
pub fn reactive_selector<C: Host>(children: Vec<Node<C>>) -> Node<C> {
    Node::new(ReactiveSelector::new(children))
}

#[inline]
pub fn random_selector<C: Host>(children: Vec<Node<C>>) -> Node<C> {
    Node::new(RandomSelector::new(children))
}

/// Parallel node that succeeds when all children succeed and fails on the first failure.
#[inline]
pub fn parallel<C: Host>(children: Vec<Node<C>>) -> Node<C> {
    Node::new(Parallel::new(children))
}

#[inline]
pub fn succeed<C: Host>(child: Node<C>) -> Node<C> {
    Node::new(Succeed::new(child))
}

#[inline]
pub fn fail<C: Host>(child: Node<C>) -> Node<C> {
    Node::new(Fail::new(child))
}

#[inline]
pub fn inverter<C: Host>(child: Node<C>) -> Node<C> {
    Node::new(Inverter::new(child))
}

/// Repeats `child` on success, stopping after `max_repeats` completions (0 = forever).
#[inline]
pub fn repeat<C: Host>(child: Node<C>, max_repeats: u32) -> Node<C> {
    Node::new(Repeat::new(child).max_repeats(max_repeats))
}

#[inline]
pub fn timeout<C: Host>(child: Node<C>, duration: f32) -> Node<C> {
    Node::new(Timeout::new(child, duration))
}

#[inline]
pub fn wait<C: Host>(duration: f32) -> Node<C> {
    Node::new(Wait::new(duration))
}

#[inline]
pub fn log<C: Host>(message: impl Into<String>) -> Node<C> {
    Node::new(Log::new(message))
}

#[inline]
pub fn set_property<C: Host>(pair: PropertyPair) -> Node<C> {
    Node::new(SetProperty::new(pair))
}

#[inline]
pub fn compare_property<C: Host>(pair: PropertyPair) -> Node<C> {
    Node::new(CompareProperty::new(pair))
}

#[inline]
pub fn random_failure<C: Host>(chance_of_failure: f32) -> Node<C> {
    Node::new(RandomFailure::new(chance_of_failure))
}

#[inline]
pub fn breakpoint<C: Host>() -> Node<C> {
    Node::new(Breakpoint)
}

#[inline]
pub fn condition<C, F>(cond: F) -> Node<C>
where
    C: Host,
    F: Fn(&TickContext, Option<&C>, &Blackboard) -> bool + Clone + 'static,
{
    Node::new(Condition::new(cond))
}

#[inline]
pub fn subtree<C: Host>(template: Tree<C>) -> Node<C> {
    Node::new(SubTree::new(template))
}
