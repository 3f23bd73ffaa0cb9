mod common;

use bt::builder::{
    parallel, random_selector, reactive_selector, reactive_sequence, selector, sequence,
    set_property,
};
use bt::{BbKey, Node, Parallel, PropertyPair, Status, Tree};
use common::{always, run, scripted};

use Status::{Failure, Running, Success};

#[test]
fn empty_composites_have_fixed_results() {
    let cases: Vec<(Node<()>, Status)> = vec![
        (sequence(vec![]), Success),
        (selector(vec![]), Failure),
        (reactive_sequence(vec![]), Success),
        (reactive_selector(vec![]), Failure),
        (random_selector(vec![]), Failure),
        (parallel(vec![]), Success),
    ];
    for (root, expected) in cases {
        let name = root.name();
        let mut tree = Tree::new(root);
        assert_eq!(run(&mut tree, 1, 0.1), vec![expected], "{name}");
    }
}

#[test]
fn sequence_resumes_at_running_child() {
    let (first, first_counters) = always(Success);
    let (second, _) = scripted(vec![Running, Success]);
    let (third, third_counters) = always(Success);
    let mut tree: Tree = Tree::new(sequence(vec![first, second, third]));

    assert_eq!(run(&mut tree, 2, 0.1), vec![Running, Success]);
    // The first child finished on tick one and is not re-evaluated.
    assert_eq!(first_counters.updates(), 1);
    assert_eq!(third_counters.updates(), 1);
}

#[test]
fn sequence_stops_at_first_failure() {
    let (first, _) = always(Failure);
    let (second, second_counters) = always(Success);
    let mut tree: Tree = Tree::new(sequence(vec![first, second]));

    assert_eq!(run(&mut tree, 3, 0.1), vec![Failure, Failure, Failure]);
    assert_eq!(second_counters.starts(), 0);
}

#[test]
fn selector_returns_first_success() {
    let (first, _) = always(Failure);
    let (second, _) = scripted(vec![Running, Success]);
    let (third, third_counters) = always(Success);
    let mut tree: Tree = Tree::new(selector(vec![first, second, third]));

    assert_eq!(run(&mut tree, 2, 0.1), vec![Running, Success]);
    assert_eq!(third_counters.starts(), 0);
}

#[test]
fn selector_fails_when_every_child_fails() {
    let (a, a_counters) = always(Failure);
    let (b, b_counters) = always(Failure);
    let mut tree: Tree = Tree::new(selector(vec![a, b]));

    assert_eq!(run(&mut tree, 1, 0.1), vec![Failure]);
    assert_eq!(a_counters.stops(), 1);
    assert_eq!(b_counters.stops(), 1);
}

#[test]
fn reactive_sequence_aborts_running_child_when_guard_fails() {
    let (guard, guard_counters) = scripted(vec![Success, Failure]);
    let (action, action_counters) = always(Running);
    let mut tree: Tree = Tree::new(reactive_sequence(vec![guard, action]));

    assert_eq!(run(&mut tree, 2, 0.1), vec![Running, Failure]);
    assert_eq!(guard_counters.updates(), 2);
    assert_eq!(action_counters.starts(), 1);
    assert_eq!(action_counters.stops(), 1);
}

#[test]
fn reactive_selector_preempts_lower_priority_child() {
    let (high, high_counters) = scripted(vec![Failure, Running]);
    let (low, low_counters) = always(Running);
    let mut tree: Tree = Tree::new(reactive_selector(vec![high, low]));

    assert_eq!(run(&mut tree, 2, 0.1), vec![Running, Running]);
    assert_eq!(high_counters.starts(), 2);
    assert_eq!(low_counters.starts(), 1);
    assert_eq!(low_counters.stops(), 1);
    assert!(!tree.root().children()[1].is_started());
}

#[test]
fn random_selector_is_seeded_by_tree() {
    const PICK: BbKey<i64> = BbKey::new("pick");

    let picks = |seed: u64| -> Vec<i64> {
        let children = (0..4)
            .map(|i| set_property(PropertyPair::literal("pick", i as i64)))
            .collect();
        let mut tree: Tree = Tree::new(random_selector(children)).with_seed(seed);
        (0..32)
            .map(|_| {
                run(&mut tree, 1, 0.1);
                tree.get(PICK).unwrap_or(-1)
            })
            .collect()
    };

    let a = picks(5);
    assert_eq!(a, picks(5));
    assert!(a.iter().all(|p| (0..4).contains(p)));
    // 32 draws over 4 children should not all land on the same one.
    assert!(a.iter().any(|p| *p != a[0]));
}

#[test]
fn random_selector_runs_only_the_chosen_child() {
    let leaves: Vec<_> = (0..3).map(|_| always(Success)).collect();
    let counters: Vec<_> = leaves.iter().map(|(_, c)| c.clone()).collect();
    let children = leaves.into_iter().map(|(node, _)| node).collect();
    let mut tree: Tree = Tree::new(random_selector(children)).with_seed(1);

    assert!(run(&mut tree, 10, 0.1).iter().all(|s| *s == Success));
    assert_eq!(counters.iter().map(|c| c.starts()).sum::<u32>(), 10);
}

#[test]
fn parallel_waits_for_all_successes() {
    let (a, a_counters) = always(Success);
    let (b, _) = scripted(vec![Running, Running, Success]);
    let mut tree: Tree = Tree::new(parallel(vec![a, b]));

    assert_eq!(run(&mut tree, 3, 0.1), vec![Running, Running, Success]);
    // Finished children are not ticked again within the activation.
    assert_eq!(a_counters.updates(), 1);
}

#[test]
fn parallel_fails_fast_and_aborts_running_children() {
    let (a, a_counters) = always(Running);
    let (b, _) = always(Failure);
    let mut tree: Tree = Tree::new(parallel(vec![a, b]));

    assert_eq!(run(&mut tree, 1, 0.1), vec![Failure]);
    assert_eq!(a_counters.starts(), 1);
    assert_eq!(a_counters.stops(), 1);
}

#[test]
fn parallel_success_threshold() {
    let (a, a_counters) = always(Running);
    let (b, _) = always(Success);
    let root = Node::new(Parallel::new(vec![a, b]).with_success_threshold(1));
    let mut tree: Tree = Tree::new(root);

    assert_eq!(run(&mut tree, 1, 0.1), vec![Success]);
    assert_eq!(a_counters.stops(), 1);
}

#[test]
fn parallel_failure_threshold_tolerates_failures() {
    let (a, _) = always(Failure);
    let (b, _) = scripted(vec![Running, Success]);
    let (c, _) = always(Running);
    let root = Node::new(
        Parallel::new(vec![a, b, c])
            .with_success_threshold(1)
            .with_failure_threshold(2),
    );
    let mut tree: Tree = Tree::new(root);

    assert_eq!(run(&mut tree, 2, 0.1), vec![Running, Success]);
}

#[test]
fn parallel_fails_once_success_is_unreachable() {
    let (a, _) = always(Failure);
    let (b, _) = always(Failure);
    let (c, c_counters) = always(Running);
    let root = Node::new(
        Parallel::new(vec![a, b, c])
            .with_success_threshold(2)
            .with_failure_threshold(3),
    );
    let mut tree: Tree = Tree::new(root);

    assert_eq!(run(&mut tree, 1, 0.1), vec![Failure]);
    assert_eq!(c_counters.stops(), 1);
}
