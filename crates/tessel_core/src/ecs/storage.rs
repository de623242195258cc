//! # Component Storage
//!
//! Dense storage for a single component kind.
//!
//! The store keeps two parallel vectors:
//! - `components[i]` is the value
//! - `entities[i]` is the entity that owns it
//!
//! Lookup by entity is a linear scan. In exchange, the values stay packed and
//! the per-tick update walks contiguous memory.
//!
//! ## Update cursor
//!
//! While an update pass runs, the store remembers the index of the next
//! element to visit. Erasing an element at or before the element being
//! visited shifts everything after it down by one, so the cursor steps back
//! with it: the element that slid into the erased slot is visited next and
//! nothing already visited is visited again.

use super::component::Component;
use super::entity::EntityId;

/// Storage for every component of kind `C`.
///
/// # Example
///
/// ```rust
/// use tessel_core::{Component, ComponentStore, EntityId};
///
/// struct Speed(f32);
/// impl Component for Speed {}
///
/// let mut store = ComponentStore::<Speed>::new();
/// let id = EntityId::from_raw(7);
/// store.add(id, Speed(1.5));
/// assert_eq!(store.get(id).map(|s| s.0), Some(1.5));
/// ```
pub struct ComponentStore<C: Component> {
    /// Component values, index-aligned with `entities`.
    components: Vec<C>,
    /// Owning entity of each value.
    entities: Vec<EntityId>,
    /// Next index to visit while a pass is in progress.
    cursor: Option<usize>,
    /// Tick priority.
    priority: u32,
}

impl<C: Component> ComponentStore<C> {
    /// Creates an empty store using `C::PRIORITY`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty store with room for `capacity` components.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            components: Vec::with_capacity(capacity),
            entities: Vec::with_capacity(capacity),
            cursor: None,
            priority: C::PRIORITY,
        }
    }

    /// Overrides the tick priority of this store.
    ///
    /// Only meaningful before the store is handed to a manager; the dispatch
    /// position is fixed when the store is registered.
    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Returns the tick priority.
    #[inline]
    #[must_use]
    pub const fn priority(&self) -> u32 {
        self.priority
    }

    /// Returns the number of stored components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Checks whether the store is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns the index of `entity`'s component.
    ///
    /// Indices shift on removal; do not hold on to them.
    #[inline]
    #[must_use]
    pub fn position(&self, entity: EntityId) -> Option<usize> {
        self.entities.iter().position(|&e| e == entity)
    }

    /// Checks whether `entity` has a component here.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.position(entity).is_some()
    }

    /// Attaches `component` to `entity`.
    ///
    /// If `entity` already has one, the existing component is returned
    /// unchanged and `component` is dropped.
    pub fn add(&mut self, entity: EntityId, component: C) -> &mut C {
        self.insert(entity, component).0
    }

    /// Like [`ComponentStore::add`], also reporting whether a new component
    /// was stored.
    pub(crate) fn insert(&mut self, entity: EntityId, component: C) -> (&mut C, bool) {
        if let Some(index) = self.position(entity) {
            return (&mut self.components[index], false);
        }

        self.components.push(component);
        self.entities.push(entity);

        let index = self.components.len() - 1;
        let slot = &mut self.components[index];
        slot.on_add(entity);
        (slot, true)
    }

    /// Gets `entity`'s component.
    #[inline]
    #[must_use]
    pub fn get(&self, entity: EntityId) -> Option<&C> {
        self.position(entity).map(|index| &self.components[index])
    }

    /// Gets `entity`'s component mutably.
    #[inline]
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut C> {
        self.position(entity).map(|index| &mut self.components[index])
    }

    /// Removes `entity`'s component, running `on_remove` first.
    ///
    /// # Returns
    ///
    /// `true` if a component was removed, `false` if there was none.
    pub fn remove(&mut self, entity: EntityId) -> bool {
        let Some(index) = self.position(entity) else {
            return false;
        };

        self.components[index].on_remove(entity);

        // Erasing at or before the visited element: step back so the
        // element sliding into this slot is the next one visited.
        if let Some(next) = self.cursor {
            if index < next {
                self.cursor = Some(next - 1);
            }
        }

        self.components.remove(index);
        self.entities.remove(index);
        true
    }

    /// Removes every component, running `on_remove` for each.
    ///
    /// # Returns
    ///
    /// The entities that lost a component, in storage order.
    pub fn clear(&mut self) -> Vec<EntityId> {
        for (component, &entity) in self.components.iter_mut().zip(&self.entities) {
            component.on_remove(entity);
        }
        self.components.clear();
        self.cursor = self.cursor.map(|_| 0);
        std::mem::take(&mut self.entities)
    }

    /// Returns the owning entities in storage order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Returns the component values in storage order.
    #[inline]
    #[must_use]
    pub fn components(&self) -> &[C] {
        &self.components
    }

    /// Returns the component values mutably, for batch processing.
    ///
    /// Values may change; which entity owns which slot may not.
    #[inline]
    pub fn components_mut(&mut self) -> &mut [C] {
        &mut self.components
    }

    /// Iterates over `(entity, component)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &C)> {
        self.entities.iter().copied().zip(self.components.iter())
    }

    /// Iterates mutably over `(entity, component)` pairs in storage order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut C)> {
        self.entities.iter().copied().zip(self.components.iter_mut())
    }

    /// Checks whether `other` holds exactly the same entities in the same
    /// order, so indices mean the same thing in both.
    #[must_use]
    pub fn same_associations(&self, other: &Self) -> bool {
        self.entities == other.entities
    }

    // =========================================================================
    // Update pass cursor
    // =========================================================================

    /// Starts a pass at the first element.
    pub(crate) fn begin_pass(&mut self) {
        self.cursor = Some(0);
    }

    /// Advances the cursor, returning the entity to visit next.
    ///
    /// Returns `None` when the pass is over or no pass is running.
    pub(crate) fn next_in_pass(&mut self) -> Option<EntityId> {
        let next = self.cursor?;
        let entity = *self.entities.get(next)?;
        self.cursor = Some(next + 1);
        Some(entity)
    }

    /// Ends the current pass.
    pub(crate) fn end_pass(&mut self) {
        self.cursor = None;
    }

    /// Returns the pass cursor, `None` outside a pass.
    #[inline]
    pub(crate) const fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Adopts the cursor of a store this one replaces mid-pass.
    pub(crate) fn set_cursor(&mut self, cursor: Option<usize>) {
        self.cursor = cursor;
    }
}

impl<C: Component> Default for ComponentStore<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies values and associations. The copy is never mid-pass.
impl<C: Component + Clone> Clone for ComponentStore<C> {
    fn clone(&self) -> Self {
        Self {
            components: self.components.clone(),
            entities: self.entities.clone(),
            cursor: None,
            priority: self.priority,
        }
    }
}

impl<C: Component + std::fmt::Debug> std::fmt::Debug for ComponentStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentStore")
            .field("priority", &self.priority)
            .field("cursor", &self.cursor)
            .field("entries", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}
