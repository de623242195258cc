//! # Store Registry
//!
//! Type-erased home of every component store.
//!
//! ```text
//! slots:  [ Some(Health), Some(Poison), None, ... ]   indexed by KindId
//! order:  [ Poison(u32::MAX), Health(0) ]            descending priority
//! ```
//!
//! Stores are held as `Box<dyn ErasedStore>` so the manager can walk them
//! without knowing their component types. The dispatch order is decided once,
//! when a store is registered: it goes after every store of greater or equal
//! priority, so equal priorities keep their registration order.

use std::any::{type_name, Any};

use super::component::Component;
use super::entity::EntityId;
use super::kind::{KindId, MAX_KINDS};
use super::manager::Manager;
use super::pass;
use super::storage::ComponentStore;

/// Runs one update pass of a store's kind over the manager.
pub type PassFn = fn(&mut Manager);

/// Uniform interface over every `ComponentStore<C>`.
pub trait ErasedStore: Any {
    /// Type name of the stored component kind.
    fn kind_name(&self) -> &'static str;

    /// Tick priority of the store.
    fn priority(&self) -> u32;

    /// Number of stored components.
    fn len(&self) -> usize;

    /// Checks whether the store is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks whether `entity` has a component here.
    fn contains(&self, entity: EntityId) -> bool;

    /// Removes `entity`'s component, if any.
    fn remove_entity(&mut self, entity: EntityId) -> bool;

    /// Owning entities in storage order.
    fn entities(&self) -> &[EntityId];

    /// Removes every component, returning the affected entities.
    fn clear(&mut self) -> Vec<EntityId>;

    /// The update pass for this store's kind.
    fn run_pass(&self) -> PassFn;

    /// Pass cursor, carried across a replacement.
    fn cursor(&self) -> Option<usize>;

    /// Adopts a pass cursor.
    fn set_cursor(&mut self, cursor: Option<usize>);

    /// Upcast for typed access.
    fn as_any(&self) -> &dyn Any;

    /// Upcast for typed mutable access.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Upcast for taking the typed store back.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<C: Component> ErasedStore for ComponentStore<C> {
    fn kind_name(&self) -> &'static str {
        type_name::<C>()
    }

    fn priority(&self) -> u32 {
        ComponentStore::priority(self)
    }

    fn len(&self) -> usize {
        ComponentStore::len(self)
    }

    fn contains(&self, entity: EntityId) -> bool {
        ComponentStore::contains(self, entity)
    }

    fn remove_entity(&mut self, entity: EntityId) -> bool {
        self.remove(entity)
    }

    fn entities(&self) -> &[EntityId] {
        ComponentStore::entities(self)
    }

    fn clear(&mut self) -> Vec<EntityId> {
        ComponentStore::clear(self)
    }

    fn run_pass(&self) -> PassFn {
        pass::run::<C>
    }

    fn cursor(&self) -> Option<usize> {
        ComponentStore::cursor(self)
    }

    fn set_cursor(&mut self, cursor: Option<usize>) {
        ComponentStore::set_cursor(self, cursor);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Holds at most one store per kind plus the dispatch order.
pub struct StoreRegistry {
    /// One slot per possible kind.
    slots: Vec<Option<Box<dyn ErasedStore>>>,
    /// Active kinds in descending priority.
    order: Vec<KindId>,
}

impl StoreRegistry {
    /// Creates a registry with every slot empty.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: (0..MAX_KINDS).map(|_| None).collect(),
            order: Vec::with_capacity(MAX_KINDS),
        }
    }

    /// Returns the number of active stores.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Checks whether no store is active.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Checks whether a store exists for `kind`.
    #[inline]
    #[must_use]
    pub fn has(&self, kind: KindId) -> bool {
        self.get(kind).is_some()
    }

    /// Gets the store for `kind`.
    #[inline]
    #[must_use]
    pub fn get(&self, kind: KindId) -> Option<&dyn ErasedStore> {
        self.slots.get(kind.index())?.as_deref()
    }

    /// Gets the store for `kind` mutably.
    #[inline]
    pub fn get_mut(&mut self, kind: KindId) -> Option<&mut (dyn ErasedStore + 'static)> {
        self.slots.get_mut(kind.index())?.as_deref_mut()
    }

    /// Gets the store for `kind` as a `ComponentStore<C>`.
    ///
    /// Returns `None` if there is no store or it holds another type.
    #[must_use]
    pub fn typed<C: Component>(&self, kind: KindId) -> Option<&ComponentStore<C>> {
        self.get(kind)?.as_any().downcast_ref()
    }

    /// Gets the store for `kind` as a mutable `ComponentStore<C>`.
    pub fn typed_mut<C: Component>(&mut self, kind: KindId) -> Option<&mut ComponentStore<C>> {
        self.get_mut(kind)?.as_any_mut().downcast_mut()
    }

    /// Gets the store for `kind`, creating it with `create` on first use.
    pub(crate) fn typed_or_insert_with<C: Component>(
        &mut self,
        kind: KindId,
        create: impl FnOnce() -> ComponentStore<C>,
    ) -> &mut ComponentStore<C> {
        if !self.has(kind) {
            tracing::debug!(kind = type_name::<C>(), id = kind.get(), "creating component store");
            self.register(kind, Box::new(create()));
        }
        // The slot was just filled with a ComponentStore<C> if it was empty,
        // and kind ids are unique per type.
        match self.typed_mut::<C>(kind) {
            Some(store) => store,
            None => unreachable!("kind {} is bound to another store type", kind.get()),
        }
    }

    /// Installs `store` for `kind`.
    ///
    /// The first registration wins: if a store already exists the new one is
    /// dropped and `false` is returned.
    pub fn register(&mut self, kind: KindId, store: Box<dyn ErasedStore>) -> bool {
        let Some(slot) = self.slots.get_mut(kind.index()) else {
            return false;
        };
        if slot.is_some() {
            tracing::debug!(
                kind = store.kind_name(),
                id = kind.get(),
                "store already registered, ignoring"
            );
            return false;
        }

        let priority = store.priority();
        *slot = Some(store);

        let position = self
            .order
            .iter()
            .position(|&k| self.priority_of(k) < priority)
            .unwrap_or(self.order.len());
        self.order.insert(position, kind);
        true
    }

    /// Removes the store for `kind` from the table and the dispatch order.
    ///
    /// The caller owns the returned store and decides what to tear down.
    pub fn delete(&mut self, kind: KindId) -> Option<Box<dyn ErasedStore>> {
        let store = self.slots.get_mut(kind.index())?.take()?;
        self.order.retain(|&k| k != kind);
        tracing::debug!(kind = store.kind_name(), id = kind.get(), "deleted component store");
        Some(store)
    }

    /// Swaps in `store` for the existing store of `kind`, keeping its
    /// dispatch position and any in-progress pass cursor.
    ///
    /// # Returns
    ///
    /// The previous store, or `Err(store)` if `kind` had none.
    pub fn replace(
        &mut self,
        kind: KindId,
        mut store: Box<dyn ErasedStore>,
    ) -> Result<Box<dyn ErasedStore>, Box<dyn ErasedStore>> {
        let Some(Some(old)) = self.slots.get_mut(kind.index()) else {
            return Err(store);
        };
        store.set_cursor(old.cursor());
        tracing::debug!(kind = store.kind_name(), id = kind.get(), "replaced component store");
        Ok(std::mem::replace(old, store))
    }

    /// Active kinds in dispatch order.
    #[inline]
    #[must_use]
    pub fn order(&self) -> &[KindId] {
        &self.order
    }

    /// Refills `plan` with the kinds and pass functions to run this tick, in
    /// dispatch order.
    ///
    /// The plan is a snapshot so stores created mid-tick wait for the next
    /// one. Reusing the same buffer every tick keeps the tick allocation-free
    /// once the buffer has grown.
    pub fn fill_dispatch_plan(&self, plan: &mut Vec<(KindId, PassFn)>) {
        plan.clear();
        plan.extend(
            self.order
                .iter()
                .filter_map(|&kind| self.get(kind).map(|store| (kind, store.run_pass()))),
        );
    }

    fn priority_of(&self, kind: KindId) -> u32 {
        self.get(kind).map_or(0, ErasedStore::priority)
    }

    /// Drops every store.
    pub(crate) fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.order.clear();
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Low;
    impl Component for Low {
        const PRIORITY: u32 = 10;
    }

    struct High;
    impl Component for High {
        const PRIORITY: u32 = 20;
    }

    struct AlsoHigh;
    impl Component for AlsoHigh {
        const PRIORITY: u32 = 20;
    }

    const LOW: KindId = KindId::new(1);
    const HIGH: KindId = KindId::new(2);
    const ALSO_HIGH: KindId = KindId::new(3);

    fn registry() -> StoreRegistry {
        let mut registry = StoreRegistry::new();
        assert!(registry.register(LOW, Box::new(ComponentStore::<Low>::new())));
        assert!(registry.register(HIGH, Box::new(ComponentStore::<High>::new())));
        assert!(registry.register(ALSO_HIGH, Box::new(ComponentStore::<AlsoHigh>::new())));
        registry
    }

    #[test]
    fn test_order_is_descending_with_stable_ties() {
        let registry = registry();
        assert_eq!(registry.order(), &[HIGH, ALSO_HIGH, LOW]);

        let mut plan = vec![(KindId::new(99), pass::run::<Low> as PassFn)];
        registry.fill_dispatch_plan(&mut plan);
        let kinds: Vec<KindId> = plan.iter().map(|&(kind, _)| kind).collect();
        assert_eq!(kinds, vec![HIGH, ALSO_HIGH, LOW]);
    }

    #[test]
    fn test_first_registration_wins() {
        let mut registry = registry();
        let mut replacement = ComponentStore::<Low>::new();
        replacement.add(EntityId::from_raw(1), Low);

        assert!(!registry.register(LOW, Box::new(replacement)));
        assert!(registry.typed::<Low>(LOW).unwrap().is_empty());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_delete_updates_order() {
        let mut registry = registry();
        let deleted = registry.delete(HIGH);
        assert!(deleted.is_some());
        assert!(!registry.has(HIGH));
        assert_eq!(registry.order(), &[ALSO_HIGH, LOW]);
        assert!(registry.delete(HIGH).is_none());
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut registry = registry();
        let store = ComponentStore::<High>::new().with_priority(0);
        assert!(registry.replace(HIGH, Box::new(store)).is_ok());
        assert_eq!(registry.order(), &[HIGH, ALSO_HIGH, LOW]);
        assert_eq!(registry.get(HIGH).unwrap().priority(), 0);

        let missing = registry.replace(KindId::new(9), Box::new(ComponentStore::<High>::new()));
        assert!(missing.is_err());
    }

    #[test]
    fn test_typed_access_checks_type() {
        let registry = registry();
        assert!(registry.typed::<Low>(LOW).is_some());
        assert!(registry.typed::<High>(LOW).is_none());
        assert!(registry.typed::<Low>(KindId::new(100)).is_none());
    }

    #[test]
    fn test_lazy_creation() {
        let mut registry = StoreRegistry::new();
        registry
            .typed_or_insert_with::<Low>(LOW, ComponentStore::new)
            .add(EntityId::from_raw(5), Low);
        registry.typed_or_insert_with::<Low>(LOW, ComponentStore::new);
        assert_eq!(registry.get(LOW).unwrap().len(), 1);
        assert_eq!(registry.len(), 1);
    }
}
