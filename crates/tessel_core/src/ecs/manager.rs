//! # ECS Manager
//!
//! The composition root: owns every entity record and every component store,
//! and drives the tick.
//!
//! ```text
//! Manager
//!   ├─ EntityRegistry   id -> { owner, kind mask }
//!   └─ StoreRegistry    kind -> Box<dyn ErasedStore>, dispatch order
//! ```
//!
//! Dropping the manager destroys all entities (running `on_remove` hooks)
//! and then all stores.

use std::any::type_name;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use super::component::Component;
use super::entity::{ComponentMask, EntityId, EntityRegistry};
use super::handle::{EntityMut, EntityRef};
use super::kind::{kind_of, lookup_kind, KindId, KindRegistry};
use super::registry::{PassFn, StoreRegistry};
use super::storage::ComponentStore;
use crate::config::ManagerConfig;
use crate::error::{EcsError, EcsResult};

/// Source of manager tokens. Zero is never handed out.
static NEXT_MANAGER_ID: AtomicU32 = AtomicU32::new(1);

/// Token naming a manager. Entity records carry it instead of a pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ManagerId(u32);

impl ManagerId {
    /// Allocates a fresh token.
    pub(crate) fn next() -> Self {
        Self(NEXT_MANAGER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// The ECS manager - container for all entities and stores of one
/// simulation.
///
/// # Example
///
/// ```rust
/// use tessel_core::{Component, EntityMut, Manager};
///
/// struct Counter(u32);
///
/// impl Component for Counter {
///     fn update(mut entity: EntityMut<'_>) {
///         if let Some(counter) = entity.get_mut::<Counter>() {
///             counter.0 += 1;
///         }
///     }
/// }
///
/// let mut manager = Manager::new();
/// let id = manager.create_entity();
/// manager.add_component(id, Counter(0));
///
/// manager.tick();
/// manager.tick();
/// assert_eq!(manager.get_component::<Counter>(id).map(|c| c.0), Some(2));
/// ```
pub struct Manager {
    /// This manager's token.
    id: ManagerId,
    /// Capacity hints and logging switches.
    config: ManagerConfig,
    /// Entity records.
    entities: EntityRegistry,
    /// Component stores and dispatch order.
    pub(crate) stores: StoreRegistry,
    /// Dispatch plan buffer, refilled every tick.
    plan: Vec<(KindId, PassFn)>,
    /// Set while `tick` runs.
    ticking: bool,
    /// Completed ticks.
    tick_count: u64,
}

impl Manager {
    /// Creates a manager with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    /// Creates a manager with `config`.
    #[must_use]
    pub fn with_config(config: ManagerConfig) -> Self {
        let id = ManagerId::next();
        tracing::debug!(manager = id.raw(), ?config, "created manager");

        Self {
            id,
            entities: EntityRegistry::with_capacity(config.entity_capacity),
            stores: StoreRegistry::new(),
            config,
            plan: Vec::new(),
            ticking: false,
            tick_count: 0,
        }
    }

    /// Returns this manager's token.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ManagerId {
        self.id
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Returns the number of completed ticks.
    #[inline]
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Checks whether a tick is running.
    #[inline]
    #[must_use]
    pub const fn is_ticking(&self) -> bool {
        self.ticking
    }

    /// Registers kind `C` in the global kind registry ahead of use.
    ///
    /// Lazy registration panics on a kind-limit or id conflict; calling this
    /// at startup reports the same failure as an error instead.
    ///
    /// # Errors
    ///
    /// See [`KindRegistry::register`].
    pub fn register_kind<C: Component>(&self) -> EcsResult<KindId> {
        KindRegistry::global().lock().register::<C>()
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Returns the number of live entities.
    #[inline]
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Creates an entity with no components.
    pub fn create_entity(&mut self) -> EntityId {
        self.entities.create(self.id)
    }

    /// Creates `count` entities with no components.
    pub fn create_entities(&mut self, count: usize) -> Vec<EntityId> {
        self.entities.create_many(self.id, count)
    }

    /// Checks whether `id` names a live entity.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains(id)
    }

    /// Returns every live entity id in ascending order.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.ids()
    }

    /// Looks up a live entity.
    ///
    /// Returns `None` if the id was never allocated or has been destroyed.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<EntityRef<'_>> {
        let record = self.entities.get(id)?;
        debug_assert_eq!(record.owner(), self.id);
        Some(EntityRef::new(self, id))
    }

    /// Looks up a live entity for mutation.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<EntityMut<'_>> {
        let record = self.entities.get(id)?;
        debug_assert_eq!(record.owner(), self.id);
        Some(EntityMut::new(self, id))
    }

    /// Destroys an entity and every component it holds.
    ///
    /// # Returns
    ///
    /// `true` if the entity existed.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        self.entities.destroy(id, &mut self.stores)
    }

    /// Returns the kind mask of `id`, empty if it is not live.
    #[must_use]
    pub fn mask_of(&self, id: EntityId) -> ComponentMask {
        self.entities
            .get(id)
            .map_or(ComponentMask::EMPTY, |entity| entity.mask())
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches `component` to `id`, creating the kind's store on first use.
    ///
    /// If the entity already has a `C`, that one is returned unchanged.
    /// Returns `None` if the entity is not live.
    ///
    /// # Panics
    ///
    /// Panics if `C` cannot be given a kind id (see [`kind_of`]).
    pub fn add_component<C: Component>(&mut self, id: EntityId, component: C) -> Option<&mut C> {
        let kind = kind_of::<C>();
        let entity = self.entities.get_mut(id)?;
        let capacity = self.config.store_capacity;
        let store = self
            .stores
            .typed_or_insert_with::<C>(kind, || ComponentStore::with_capacity(capacity));

        let (component, inserted) = store.insert(id, component);
        if inserted {
            entity.mask.insert(kind);
        }
        Some(component)
    }

    /// Gets `id`'s `C` component.
    #[must_use]
    pub fn get_component<C: Component>(&self, id: EntityId) -> Option<&C> {
        let kind = lookup_kind::<C>()?;
        if !self.entities.get(id)?.has_component(kind) {
            return None;
        }
        self.stores.typed::<C>(kind)?.get(id)
    }

    /// Gets `id`'s `C` component mutably.
    pub fn get_component_mut<C: Component>(&mut self, id: EntityId) -> Option<&mut C> {
        let kind = lookup_kind::<C>()?;
        if !self.entities.get(id)?.has_component(kind) {
            return None;
        }
        self.stores.typed_mut::<C>(kind)?.get_mut(id)
    }

    /// Removes `id`'s `C` component, running its `on_remove` hook.
    ///
    /// # Returns
    ///
    /// `true` if a component was removed.
    pub fn remove_component<C: Component>(&mut self, id: EntityId) -> bool {
        let Some(kind) = lookup_kind::<C>() else {
            return false;
        };
        let Some(entity) = self.entities.get_mut(id) else {
            return false;
        };
        if !entity.has_component(kind) {
            return false;
        }

        let removed = self
            .stores
            .get_mut(kind)
            .is_some_and(|store| store.remove_entity(id));
        entity.mask.remove(kind);
        removed
    }

    /// Checks whether `id` has a `C` component.
    #[must_use]
    pub fn has_component<C: Component>(&self, id: EntityId) -> bool {
        lookup_kind::<C>().is_some_and(|kind| self.mask_of(id).contains(kind))
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Runs one tick: every store's update, highest priority first.
    ///
    /// Stores created during the tick first run on the next one. Calling
    /// `tick` from inside update logic is refused.
    pub fn tick(&mut self) {
        if self.ticking {
            tracing::warn!(tick = self.tick_count, "tick requested during a tick, ignoring");
            return;
        }

        self.ticking = true;
        let started = self.config.log_ticks.then(Instant::now);

        let mut plan = std::mem::take(&mut self.plan);
        self.stores.fill_dispatch_plan(&mut plan);
        for &(kind, pass) in &plan {
            if self.stores.has(kind) {
                pass(self);
            }
        }
        self.plan = plan;

        self.ticking = false;
        self.tick_count += 1;

        if let Some(started) = started {
            tracing::debug!(
                tick = self.tick_count,
                stores = self.stores.len(),
                entities = self.entities.len(),
                elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
                "tick complete"
            );
        }
    }

    // =========================================================================
    // Stores
    // =========================================================================

    /// The store registry, for inspection.
    #[inline]
    #[must_use]
    pub fn stores(&self) -> &StoreRegistry {
        &self.stores
    }

    /// Gets the store for `C`.
    #[must_use]
    pub fn store<C: Component>(&self) -> Option<&ComponentStore<C>> {
        self.stores.typed::<C>(lookup_kind::<C>()?)
    }

    /// Every `C` value, mutably, in storage order.
    ///
    /// Membership cannot change through the slice; use the entity operations
    /// for that.
    pub fn components_mut<C: Component>(&mut self) -> Option<&mut [C]> {
        let kind = lookup_kind::<C>()?;
        Some(self.stores.typed_mut::<C>(kind)?.components_mut())
    }

    /// Installs a pre-built store for `C`, e.g. one with a custom priority.
    ///
    /// The first store for a kind wins: if one exists, `store` is dropped and
    /// `false` is returned. Components held for entities that are not live
    /// are removed; the rest are marked on their entities.
    ///
    /// # Panics
    ///
    /// Panics if `C` cannot be given a kind id (see [`kind_of`]).
    pub fn register_store<C: Component>(&mut self, mut store: ComponentStore<C>) -> bool {
        let kind = kind_of::<C>();
        if self.stores.has(kind) {
            tracing::debug!(kind = type_name::<C>(), "store already registered, ignoring");
            return false;
        }

        let stale: Vec<EntityId> = store
            .entities()
            .iter()
            .copied()
            .filter(|&id| !self.entities.contains(id))
            .collect();
        for id in stale {
            store.remove(id);
        }

        for &id in store.entities() {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.mask.insert(kind);
            }
        }

        store.set_cursor(None);
        self.stores.register(kind, Box::new(store))
    }

    /// Copies the store for `C`, values and associations alike.
    ///
    /// Together with [`Manager::replace_store`] this is the snapshot-and-swap
    /// pair: prepare the next values on the copy, then swap it in.
    #[must_use]
    pub fn snapshot_store<C: Component + Clone>(&self) -> Option<ComponentStore<C>> {
        self.store::<C>().cloned()
    }

    /// Swaps in `store` for the live store of `C`, keeping its dispatch
    /// position.
    ///
    /// The replacement must hold the same entities in the same order; only
    /// values may differ. Entity masks are left untouched.
    ///
    /// # Returns
    ///
    /// The previous store.
    ///
    /// # Errors
    ///
    /// - [`EcsError::StoreMissing`] if `C` has no store.
    /// - [`EcsError::AssociationMismatch`] if the entities differ. The live
    ///   store is kept.
    pub fn replace_store<C: Component>(
        &mut self,
        store: ComponentStore<C>,
    ) -> EcsResult<ComponentStore<C>> {
        let missing = || EcsError::StoreMissing(type_name::<C>());
        let kind = lookup_kind::<C>().ok_or_else(missing)?;
        let current = self.stores.typed::<C>(kind).ok_or_else(missing)?;

        if !current.same_associations(&store) {
            return Err(EcsError::AssociationMismatch {
                kind: type_name::<C>(),
                expected: current.len(),
                found: store.len(),
            });
        }

        let previous = self
            .stores
            .replace(kind, Box::new(store))
            .map_err(|_| missing())?;
        previous
            .into_any()
            .downcast::<ComponentStore<C>>()
            .map(|previous| *previous)
            .map_err(|_| missing())
    }

    /// Deletes the store for `C`.
    ///
    /// Every component runs its `on_remove` hook and every entity that held
    /// one loses the kind's bit, so no mask ever points at a missing store.
    ///
    /// # Returns
    ///
    /// `true` if a store existed.
    pub fn delete_store<C: Component>(&mut self) -> bool {
        let Some(kind) = lookup_kind::<C>() else {
            return false;
        };
        let Some(mut store) = self.stores.delete(kind) else {
            return false;
        };

        let ids = store.clear();
        self.entities.clear_kind(kind, &ids);
        true
    }

    /// Destroys every entity, then every store.
    ///
    /// Newest entities go first so stores erase from their tail.
    pub fn clear(&mut self) {
        for id in self.entities.ids().into_iter().rev() {
            self.entities.destroy(id, &mut self.stores);
        }
        self.stores.clear();
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        self.clear();
        tracing::debug!(manager = self.id.raw(), ticks = self.tick_count, "dropped manager");
    }
}
