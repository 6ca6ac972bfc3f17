/// Property-based tests for the registry and the state machine engine
///
/// These check identity uniqueness, the capacity bound, swap-removal
/// bookkeeping and deterministic transitions over random operation
/// sequences.
use card_table::{
    board::{EntityId, GameObject, IdGenerator, Registry, Vec2},
    fsm::{Next, StateMachine, StateTable},
    objects::{AtlasAsset, Entity, ObjectFactory},
};
use proptest::prelude::*;
use std::{collections::HashSet, sync::Arc};

#[derive(Clone, Debug)]
enum Op {
    Append(f64, f64),
    RemoveAt(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (-500.0..500.0f64, -500.0..500.0f64).prop_map(|(x, y)| Op::Append(x, y)),
        2 => (0usize..64).prop_map(Op::RemoveAt),
    ]
}

fn factory() -> ObjectFactory {
    ObjectFactory::new(Arc::new(AtlasAsset::standard())).unwrap()
}

fn live_ids(registry: &Registry) -> HashSet<EntityId> {
    registry.iter().map(GameObject::id).collect()
}

proptest! {
    #[test]
    fn test_registry_invariants_hold(
        capacity in 1usize..16,
        ops in prop::collection::vec(op_strategy(), 0..80),
    ) {
        let factory = factory();
        let mut registry: Registry = Registry::new(capacity, IdGenerator::new());
        let mut issued = HashSet::new();

        for op in ops {
            match op {
                Op::Append(x, y) => {
                    let before = registry.id_order();
                    let inserted = registry.insert_with(|ids| -> Entity {
                        factory.card(ids, Vec2::new(x, y), "zombies").unwrap().into()
                    });
                    match inserted {
                        Some(id) => {
                            prop_assert!(before.len() < capacity);
                            prop_assert!(issued.insert(id), "identity {} reused", id);
                        }
                        None => {
                            prop_assert_eq!(before.len(), capacity);
                            prop_assert_eq!(registry.id_order(), before);
                        }
                    }
                }
                Op::RemoveAt(index) => {
                    let before = live_ids(&registry);
                    let len = registry.len();
                    match registry.remove_at(index) {
                        Ok(removed) => {
                            prop_assert!(index < len);
                            prop_assert_eq!(registry.len(), len - 1);
                            let mut expected = before;
                            expected.remove(&removed.id());
                            prop_assert_eq!(live_ids(&registry), expected);
                        }
                        Err(_) => {
                            prop_assert!(index >= len);
                            prop_assert_eq!(registry.len(), len);
                        }
                    }
                }
            }

            prop_assert!(registry.len() <= capacity);
            prop_assert_eq!(live_ids(&registry).len(), registry.len(), "duplicate live identity");
        }
    }

    #[test]
    fn test_hit_test_returns_first_containing_object(
        xs in prop::collection::vec(-300.0..300.0f64, 1..20),
        sample_x in -300.0..300.0f64,
    ) {
        let factory = factory();
        let mut registry: Registry = Registry::new(32, IdGenerator::new());
        for x in &xs {
            registry.insert_with(|ids| -> Entity {
                factory.card(ids, Vec2::new(*x, 0.0), "bullet").unwrap().into()
            });
        }
        let point = Vec2::new(sample_x, 0.0);

        let expected = registry.iter().position(|object| object.hit_box().contains(point));
        let found = registry.find_at_position(point).unwrap().map(|(index, _)| index);

        prop_assert_eq!(found, expected);
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
enum Light {
    Red,
    Green,
    Amber,
    Flashing,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
enum Signal {
    Go,
    Slow,
    Stop,
    Fault,
    Reset,
}

#[derive(Default)]
struct Counter {
    entries: usize,
}

fn count(counter: &mut Counter) -> Next<Signal> {
    counter.entries += 1;
    Next::NoOp
}

fn signal_table() -> StateTable<Light, Signal, Counter> {
    StateTable::builder(Light::Red)
        .entry(Light::Red, count)
        .entry(Light::Green, count)
        .entry(Light::Amber, count)
        .entry(Light::Flashing, count)
        .transition(Light::Red, Signal::Go, Light::Green)
        .transition(Light::Green, Signal::Slow, Light::Amber)
        .transition(Light::Amber, Signal::Stop, Light::Red)
        .transition(Light::Red, Signal::Fault, Light::Flashing)
        .transition(Light::Green, Signal::Fault, Light::Flashing)
        .transition(Light::Amber, Signal::Fault, Light::Flashing)
        .transition(Light::Flashing, Signal::Reset, Light::Red)
        .build()
        .unwrap()
}

fn signal_strategy() -> impl Strategy<Value = Signal> {
    prop_oneof![
        Just(Signal::Go),
        Just(Signal::Slow),
        Just(Signal::Stop),
        Just(Signal::Fault),
        Just(Signal::Reset),
    ]
}

fn run_signals(
    table: &Arc<StateTable<Light, Signal, Counter>>,
    signals: &[Signal],
) -> (Vec<Option<Light>>, usize) {
    let machine = StateMachine::new(Arc::clone(table));
    let mut counter = Counter::default();
    let trace = signals
        .iter()
        .map(|signal| machine.send_event(*signal, &mut counter).ok())
        .collect();
    (trace, counter.entries)
}

proptest! {
    #[test]
    fn test_transitions_are_deterministic(
        signals in prop::collection::vec(signal_strategy(), 0..60),
    ) {
        let table = Arc::new(signal_table());

        let first = run_signals(&table, &signals);
        let second = run_signals(&table, &signals);

        prop_assert_eq!(&first, &second);
        // One entry action per accepted event.
        prop_assert_eq!(first.1, first.0.iter().filter(|state| state.is_some()).count());
    }

    #[test]
    fn test_rejection_leaves_cursor_untouched(
        signals in prop::collection::vec(signal_strategy(), 0..60),
    ) {
        let machine = StateMachine::new(Arc::new(signal_table()));
        let mut counter = Counter::default();

        for signal in signals {
            let before = machine.cursor();
            match machine.send_event(signal, &mut counter) {
                Ok(state) => {
                    prop_assert_eq!(machine.current(), state);
                    prop_assert_eq!(machine.previous(), before.current);
                }
                Err(err) => {
                    prop_assert!(err.is_rejection());
                    prop_assert_eq!(machine.cursor(), before);
                }
            }
        }
    }
}
