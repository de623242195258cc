//! # Store Management
//!
//! Dispatch ordering and the store-level operations on the manager:
//! registering pre-built stores, snapshot-and-swap replacement, deletion.

use std::cell::RefCell;

use tessel_core::{Component, ComponentStore, EcsError, EntityMut, Manager};

thread_local! {
    static ORDER: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
    static REMOVED: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

fn take_order() -> Vec<&'static str> {
    ORDER.with(|o| std::mem::take(&mut *o.borrow_mut()))
}

// =============================================================================
// Priority ordering
// =============================================================================

struct X;
impl Component for X {
    const PRIORITY: u32 = 10;
    fn update(_entity: EntityMut<'_>) {
        ORDER.with(|o| o.borrow_mut().push("X"));
    }
}

struct Y;
impl Component for Y {
    const PRIORITY: u32 = 20;
    fn update(_entity: EntityMut<'_>) {
        ORDER.with(|o| o.borrow_mut().push("Y"));
    }
}

struct Z;
impl Component for Z {
    const PRIORITY: u32 = 20;
    fn update(_entity: EntityMut<'_>) {
        ORDER.with(|o| o.borrow_mut().push("Z"));
    }
}

#[test]
fn test_descending_priority_ties_by_insertion() {
    take_order();
    let mut manager = Manager::new();
    let id = manager.create_entity();
    manager.add_component(id, X);
    manager.add_component(id, Y);
    manager.add_component(id, Z);

    manager.tick();
    assert_eq!(take_order(), ["Y", "Z", "X"]);
}

#[test]
fn test_pre_built_store_priority_override() {
    take_order();
    let mut manager = Manager::new();
    let id = manager.create_entity();

    let mut store = ComponentStore::<X>::new().with_priority(100);
    store.add(id, X);
    assert!(manager.register_store(store));
    manager.add_component(id, Y);

    manager.tick();
    assert_eq!(take_order(), ["X", "Y"]);
    assert!(manager.has_component::<X>(id));
}

// =============================================================================
// Membership
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Score(u32);

impl Component for Score {
    fn on_remove(&mut self, entity: tessel_core::EntityId) {
        REMOVED.with(|r| r.borrow_mut().push(entity.raw()));
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Flag;
impl Component for Flag {}

#[test]
fn test_add_is_idempotent() {
    let mut manager = Manager::new();
    let id = manager.create_entity();

    assert_eq!(manager.add_component(id, Score(1)), Some(&mut Score(1)));
    assert_eq!(manager.add_component(id, Score(2)), Some(&mut Score(1)));
    assert_eq!(manager.store::<Score>().unwrap().len(), 1);
}

#[test]
fn test_membership_matches_stores() {
    let mut manager = Manager::new();
    let ids = manager.create_entities(4);
    for &id in &ids[..3] {
        manager.add_component(id, Score(0));
    }
    manager.add_component(ids[1], Flag);
    manager.remove_component::<Score>(ids[2]);
    manager.destroy_entity(ids[0]);

    for &id in &ids {
        let in_store = manager.store::<Score>().unwrap().contains(id);
        assert_eq!(manager.has_component::<Score>(id), in_store);
    }

    let entity = manager.entity(ids[1]).unwrap();
    assert!(entity.has_all::<(Score, Flag)>());
    assert!(!manager.entity(ids[3]).unwrap().has_all::<(Score, Flag)>());
}

// =============================================================================
// Snapshot and swap
// =============================================================================

#[test]
fn test_replace_preserves_associations() {
    let mut manager = Manager::new();
    let ids = manager.create_entities(3);
    for (i, &id) in ids.iter().enumerate() {
        manager.add_component(id, Score(u32::try_from(i).unwrap()));
    }

    let mut next = manager.snapshot_store::<Score>().unwrap();
    for score in next.components_mut() {
        score.0 += 10;
    }
    let previous = manager.replace_store(next).unwrap();
    assert_eq!(previous.get(ids[0]), Some(&Score(0)));

    for (i, &id) in ids.iter().enumerate() {
        assert!(manager.has_component::<Score>(id));
        let expected = Score(u32::try_from(i).unwrap() + 10);
        assert_eq!(manager.get_component::<Score>(id), Some(&expected));
    }
}

/// On reaching the value 2, swaps in a copy of its own store with every
/// value multiplied by ten.
#[derive(Debug, Clone, PartialEq)]
struct Scaled(u32);

thread_local! {
    static SEEN: RefCell<Vec<u32>> = const { RefCell::new(Vec::new()) };
}

impl Component for Scaled {
    fn update(mut entity: EntityMut<'_>) {
        let Some(value) = entity.get::<Scaled>().map(|s| s.0) else {
            return;
        };
        SEEN.with(|s| s.borrow_mut().push(value));

        if value == 2 {
            let manager = entity.manager();
            let mut next = manager.snapshot_store::<Scaled>().unwrap();
            for scaled in next.components_mut() {
                scaled.0 *= 10;
            }
            manager.replace_store(next).unwrap();
        }
    }
}

#[test]
fn test_replace_during_own_pass_keeps_cursor() {
    SEEN.with(|s| s.borrow_mut().clear());
    let mut manager = Manager::new();
    for (id, value) in manager.create_entities(3).into_iter().zip(1..) {
        manager.add_component(id, Scaled(value));
    }

    manager.tick();

    assert_eq!(SEEN.with(|s| s.borrow().clone()), vec![1, 2, 30]);
    let values: Vec<u32> = manager
        .store::<Scaled>()
        .unwrap()
        .components()
        .iter()
        .map(|s| s.0)
        .collect();
    assert_eq!(values, vec![10, 20, 30]);

    // The next pass starts from the top of the swapped-in store.
    manager.tick();
    assert_eq!(SEEN.with(|s| s.borrow().clone()), vec![1, 2, 30, 10, 20, 30]);
}

#[test]
fn test_replace_rejects_different_entities() {
    let mut manager = Manager::new();
    let ids = manager.create_entities(2);
    manager.add_component(ids[0], Score(1));
    manager.add_component(ids[1], Score(2));

    let mut short = manager.snapshot_store::<Score>().unwrap();
    short.remove(ids[1]);

    let err = manager.replace_store(short).unwrap_err();
    assert!(matches!(
        err,
        EcsError::AssociationMismatch { expected: 2, found: 1, .. }
    ));
    assert_eq!(manager.get_component::<Score>(ids[1]), Some(&Score(2)));
}

#[test]
fn test_replace_without_store() {
    #[derive(Clone)]
    #[derive(Debug)]
    struct Unused;
    impl Component for Unused {}

    let mut manager = Manager::new();
    let err = manager.replace_store(ComponentStore::<Unused>::new()).unwrap_err();
    assert!(matches!(err, EcsError::StoreMissing(_)));
}

#[test]
fn test_register_store_first_wins() {
    let mut manager = Manager::new();
    let id = manager.create_entity();
    manager.add_component(id, Flag);

    let mut other = ComponentStore::<Flag>::new();
    other.add(manager.create_entity(), Flag);
    assert!(!manager.register_store(other));
    assert_eq!(manager.store::<Flag>().unwrap().entities(), &[id]);
}

// =============================================================================
// Deletion
// =============================================================================

#[test]
fn test_delete_store_clears_membership() {
    REMOVED.with(|r| r.borrow_mut().clear());
    let mut manager = Manager::new();
    let ids = manager.create_entities(2);
    for &id in &ids {
        manager.add_component(id, Score(5));
    }

    assert!(manager.delete_store::<Score>());
    assert!(!manager.delete_store::<Score>());

    let removed = REMOVED.with(|r| r.borrow().clone());
    assert_eq!(removed, vec![ids[0].raw(), ids[1].raw()]);
    for &id in &ids {
        assert!(manager.contains(id));
        assert!(!manager.has_component::<Score>(id));
        assert!(manager.get_component::<Score>(id).is_none());
    }

    // A later add starts a fresh store.
    manager.add_component(ids[0], Score(9));
    assert_eq!(manager.store::<Score>().unwrap().entities(), &[ids[0]]);
}

#[test]
fn test_drop_runs_remove_hooks() {
    REMOVED.with(|r| r.borrow_mut().clear());
    let id = {
        let mut manager = Manager::new();
        let id = manager.create_entity();
        manager.add_component(id, Score(1));
        id
    };
    assert_eq!(REMOVED.with(|r| r.borrow().clone()), vec![id.raw()]);
}
