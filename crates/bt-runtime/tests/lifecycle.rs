mod support;

use bt_runtime::keys;
use bt_runtime::nodes::{MaxTime, MemSequence, Priority, Sequence};
use bt_runtime::{BehaviorTree, Blackboard, ManualClock, Node, NodeId, State, TreeError};
use bt_tools::{Phase, TracingSink, VecTraceSink};

use support::{init_tracing, stub, World};

fn is_open(tree: &BehaviorTree<World>, bb: &Blackboard, node: &NodeId) -> bool {
    bb.get(keys::IS_OPEN, Some(tree.id().as_str()), Some(node.as_str()))
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

fn child_id(tree: &BehaviorTree<World>, index: usize) -> NodeId {
    tree.root().unwrap().children()[index].id().clone()
}

#[test]
fn ticking_without_root_is_an_error() {
    let tree = BehaviorTree::<World>::new();
    let err = tree.tick(&mut World::new(), &mut Blackboard::new()).unwrap_err();
    assert!(matches!(err, TreeError::NoRoot));
}

#[test]
fn running_node_stays_open_until_it_finishes() {
    let tree = BehaviorTree::with_root(Sequence::new(vec![stub("task", State::Success)]).boxed());
    let task = child_id(&tree, 0);
    let root = tree.root().unwrap().id().clone();
    let mut world = World::new();
    world.script("task", [State::Running, State::Running]);
    let mut bb = Blackboard::new();

    assert_eq!(tree.tick(&mut world, &mut bb).unwrap(), State::Running);
    assert!(is_open(&tree, &bb, &task));
    assert!(is_open(&tree, &bb, &root));
    assert_eq!(tree.open_nodes(&bb), vec![root.clone(), task.clone()]);

    assert_eq!(tree.tick(&mut world, &mut bb).unwrap(), State::Running);
    assert!(is_open(&tree, &bb, &task));
    // Opened once, not re-opened while running.
    assert_eq!(world.opened, ["task"]);

    assert_eq!(tree.tick(&mut world, &mut bb).unwrap(), State::Success);
    assert!(!is_open(&tree, &bb, &task));
    assert!(!is_open(&tree, &bb, &root));
    assert!(tree.open_nodes(&bb).is_empty());
    assert_eq!(world.closed, ["task"]);
}

#[test]
fn nodes_no_longer_visited_are_closed() {
    let tree = BehaviorTree::with_root(
        Priority::new(vec![stub("urgent", State::Failure), stub("task", State::Running)]).boxed(),
    );
    let task = child_id(&tree, 1);
    let mut world = World::new();
    world.script("urgent", [State::Failure, State::Success]);
    let mut bb = Blackboard::new();

    assert_eq!(tree.tick(&mut world, &mut bb).unwrap(), State::Running);
    assert!(is_open(&tree, &bb, &task));
    assert_eq!(world.closed, ["urgent"]);

    // `urgent` takes over, so `task` is not ticked but must still be closed.
    assert_eq!(tree.tick(&mut world, &mut bb).unwrap(), State::Success);
    assert_eq!(world.ticks_of("task"), 1);
    assert!(!is_open(&tree, &bb, &task));
    assert_eq!(world.closed, ["urgent", "urgent", "task"]);
    assert!(tree.open_nodes(&bb).is_empty());

    // Re-entered later, it opens afresh.
    world.script("urgent", [State::Failure]);
    tree.tick(&mut world, &mut bb).unwrap();
    assert_eq!(world.opened.iter().filter(|l| *l == "task").count(), 2);
}

#[test]
fn abandoned_mem_sequence_restarts_from_first_child() {
    let tree = BehaviorTree::with_root(
        Priority::new(vec![
            stub("interrupt", State::Failure),
            MemSequence::new(vec![stub("a", State::Success), stub("b", State::Success)]).boxed(),
        ])
        .boxed(),
    );
    let mut world = World::new();
    world.script("b", [State::Running]);
    world.script("interrupt", [State::Failure, State::Success]);
    let mut bb = Blackboard::new();

    assert_eq!(tree.tick(&mut world, &mut bb).unwrap(), State::Running);
    assert_eq!(tree.tick(&mut world, &mut bb).unwrap(), State::Success);
    world.take_log();

    assert_eq!(tree.tick(&mut world, &mut bb).unwrap(), State::Success);
    assert_eq!(world.take_log(), ["interrupt", "a", "b"]);
}

#[test]
fn timed_out_decorator_closes_its_running_child() {
    let clock = ManualClock::new(0);
    let tree = BehaviorTree::with_root(
        Priority::new(vec![
            MaxTime::new(stub("slow", State::Failure), 10).unwrap().boxed(),
            stub("task", State::Running),
        ])
        .boxed(),
    )
    .with_clock(clock.clone());
    let root = tree.root().unwrap().id().clone();
    let max_time = child_id(&tree, 0);
    let slow = tree.root().unwrap().children()[0].child().unwrap().id().clone();
    let task = child_id(&tree, 1);

    let mut world = World::new();
    world.script("slow", [State::Running, State::Running]);
    let mut bb = Blackboard::new();

    assert_eq!(tree.tick(&mut world, &mut bb).unwrap(), State::Running);
    assert_eq!(tree.open_nodes(&bb), vec![root.clone(), max_time.clone(), slow.clone()]);

    // Past the deadline: the decorator fails and takes its child down with it.
    clock.set(20);
    assert_eq!(tree.tick(&mut world, &mut bb).unwrap(), State::Running);
    assert!(!is_open(&tree, &bb, &max_time));
    assert!(!is_open(&tree, &bb, &slow));
    assert!(is_open(&tree, &bb, &task));
    assert_eq!(tree.open_nodes(&bb), vec![root.clone(), task.clone()]);
    assert_eq!(world.closed, ["slow"]);

    // `task` keeps running and is neither closed nor re-opened.
    assert_eq!(tree.tick(&mut world, &mut bb).unwrap(), State::Running);
    assert!(is_open(&tree, &bb, &task));
    assert_eq!(tree.open_nodes(&bb), vec![root, task]);
    assert_eq!(world.opened, ["slow", "task", "slow"]);
    assert_eq!(world.closed, ["slow", "slow"]);
}

#[test]
fn node_count_and_open_nodes_are_stored_per_tree() {
    let first = BehaviorTree::with_root(stub("x", State::Running));
    let second = BehaviorTree::with_root(
        Sequence::new(vec![stub("y", State::Success), stub("z", State::Success)]).boxed(),
    );
    let mut world = World::new();
    let mut bb = Blackboard::new();

    first.tick(&mut world, &mut bb).unwrap();
    second.tick(&mut world, &mut bb).unwrap();

    assert_eq!(first.node_count(&bb), 1);
    assert_eq!(first.open_nodes(&bb).len(), 1);
    assert_eq!(second.node_count(&bb), 3);
    assert!(second.open_nodes(&bb).is_empty());
    assert!(bb.has_tree_memory(first.id().as_str()));
    assert!(bb.has_tree_memory(second.id().as_str()));
}

#[test]
fn trace_sink_sees_lifecycle_in_order() {
    init_tracing();
    let tree = BehaviorTree::with_root(Sequence::new(vec![stub("a", State::Success)]).boxed());
    let mut sink = VecTraceSink::default();

    tree.tick_traced(&mut World::new(), &mut Blackboard::new(), &mut sink)
        .unwrap();

    let phases: Vec<(Phase, &str)> = sink
        .events
        .iter()
        .map(|e| (e.phase, e.name.as_str()))
        .collect();
    assert_eq!(
        phases,
        [
            (Phase::Enter, "Sequence"),
            (Phase::Open, "Sequence"),
            (Phase::Tick, "Sequence"),
            (Phase::Enter, "Stub"),
            (Phase::Open, "Stub"),
            (Phase::Tick, "Stub"),
            (Phase::Close, "Stub"),
            (Phase::Exit, "Stub"),
            (Phase::Close, "Sequence"),
            (Phase::Exit, "Sequence"),
        ]
    );

    let exits: Vec<_> = sink.phase(Phase::Exit).map(|e| e.state).collect();
    assert_eq!(exits, [Some(State::Success), Some(State::Success)]);
    assert!(sink.events.iter().all(|e| &e.tree == tree.id()));
}

#[test]
fn trace_sink_sees_stale_close() {
    let tree = BehaviorTree::with_root(
        Priority::new(vec![stub("urgent", State::Failure), stub("task", State::Running)]).boxed(),
    );
    let task = child_id(&tree, 1);
    let mut world = World::new();
    world.script("urgent", [State::Failure, State::Success]);
    let mut bb = Blackboard::new();

    tree.tick(&mut world, &mut bb).unwrap();
    let mut sink = VecTraceSink::default();
    tree.tick_traced(&mut world, &mut bb, &mut sink).unwrap();

    let last = sink.events.last().unwrap();
    assert_eq!(last.phase, Phase::Close);
    assert_eq!(last.node, task);
}

#[test]
fn tracing_sink_accepts_events() {
    init_tracing();
    let tree = BehaviorTree::with_root(stub("a", State::Failure));
    let state = tree
        .tick_traced(&mut World::new(), &mut Blackboard::new(), &mut TracingSink)
        .unwrap();
    assert_eq!(state, State::Failure);
}
