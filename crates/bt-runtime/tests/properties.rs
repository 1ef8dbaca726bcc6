//! Property tests for composite short-circuiting, the open/close invariant
//! and load/dump stability.

mod support;

use proptest::prelude::*;

use bt_runtime::keys;
use bt_runtime::nodes::{Inverter, MemSequence, Priority, Sequence};
use bt_runtime::{BehaviorTree, Blackboard, Node, State};

use support::{registry, stub, World};

fn arb_state() -> impl Strategy<Value = State> {
    prop_oneof![
        Just(State::Success),
        Just(State::Failure),
        Just(State::Running),
        Just(State::Error),
    ]
}

fn labelled(states: &[State]) -> Vec<Box<dyn Node<World>>> {
    states
        .iter()
        .enumerate()
        .map(|(i, s)| stub(&i.to_string(), *s))
        .collect()
}

/// Expected result of a short-circuiting composite and how many children it ticks.
fn short_circuit(states: &[State], pass: State) -> (State, usize) {
    match states.iter().position(|s| *s != pass) {
        Some(i) => (states[i], i + 1),
        None => (pass, states.len()),
    }
}

proptest! {
    #[test]
    fn sequence_returns_first_non_success(states in prop::collection::vec(arb_state(), 0..8)) {
        let tree = BehaviorTree::with_root(Sequence::new(labelled(&states)).boxed());
        let mut world = World::new();
        let state = tree.tick(&mut world, &mut Blackboard::new()).unwrap();

        let (expected, ticked) = short_circuit(&states, State::Success);
        prop_assert_eq!(state, expected);
        prop_assert_eq!(world.log.len(), ticked);
    }

    #[test]
    fn priority_returns_first_non_failure(states in prop::collection::vec(arb_state(), 0..8)) {
        let tree = BehaviorTree::with_root(Priority::new(labelled(&states)).boxed());
        let mut world = World::new();
        let state = tree.tick(&mut world, &mut Blackboard::new()).unwrap();

        let (expected, ticked) = short_circuit(&states, State::Failure);
        prop_assert_eq!(state, expected);
        prop_assert_eq!(world.log.len(), ticked);
    }

    #[test]
    fn double_inversion_is_identity(state in arb_state()) {
        let tree = BehaviorTree::with_root(Inverter::new(Inverter::new(stub("x", state)).boxed()).boxed());
        let result = tree.tick(&mut World::new(), &mut Blackboard::new()).unwrap();
        prop_assert_eq!(result, state);
        prop_assert_eq!(state.invert().invert(), state);
    }

    #[test]
    fn open_flag_tracks_running(scripts in prop::collection::vec(prop::collection::vec(arb_state(), 3), 1..6)) {
        // Each child gets a script of three ticks.
        let width = scripts.len();
        let tree = BehaviorTree::with_root(
            MemSequence::new(labelled(&vec![State::Success; width])).boxed(),
        );
        let mut world = World::new();
        for (i, script) in scripts.iter().enumerate() {
            world.script(&i.to_string(), script.iter().copied());
        }
        let mut bb = Blackboard::new();
        let tree_id = tree.id().as_str().to_owned();

        for _ in 0..3 {
            let before = world.log.len();
            let state = tree.tick(&mut world, &mut bb).unwrap();
            let root_open = bb
                .get(keys::IS_OPEN, Some(&tree_id), Some(tree.root().unwrap().id().as_str()))
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            prop_assert_eq!(root_open, state == State::Running);

            // Only the last child ticked this time may still be open.
            let open = tree.open_nodes(&bb);
            if state == State::Running {
                let last = world.log.last().unwrap().clone();
                prop_assert!(world.log.len() > before);
                prop_assert_eq!(open.len(), 2);
                let leaf = tree.find(&open[1]).unwrap();
                prop_assert_eq!(leaf.meta().properties()["label"].as_str(), Some(last.as_str()));
            } else {
                prop_assert!(open.is_empty());
            }
        }
    }

    #[test]
    fn load_of_dump_is_stable(states in prop::collection::vec(arb_state(), 1..6)) {
        let tree = BehaviorTree::with_root(
            Priority::new(vec![
                Sequence::new(labelled(&states)).boxed(),
                Inverter::new(stub("fallback", State::Failure)).boxed(),
            ])
            .boxed(),
        );
        let data = tree.dump();
        let loaded = BehaviorTree::from_data(&data, Some(&registry())).unwrap();
        prop_assert_eq!(loaded.dump(), data);

        let mut a = World::new();
        let mut b = World::new();
        let left = tree.tick(&mut a, &mut Blackboard::new()).unwrap();
        let right = loaded.tick(&mut b, &mut Blackboard::new()).unwrap();
        prop_assert_eq!(left, right);
        prop_assert_eq!(a.log, b.log);
    }
}
