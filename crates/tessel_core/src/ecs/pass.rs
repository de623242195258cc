//! # Update Pass
//!
//! One kind's share of a tick. The store is not borrowed while update logic
//! runs: each step re-borrows it from the manager, reads the next entity off
//! the store cursor, releases it, and hands the logic an
//! [`EntityMut`](super::handle::EntityMut). Any mutation the logic makes,
//! including removals that move the cursor, is seen by the following step.

use std::marker::PhantomData;

use super::component::Component;
use super::entity::EntityId;
use super::kind::{kind_of, KindId};
use super::manager::Manager;
use super::storage::ComponentStore;

/// Access to the manager while kind `C` updates.
///
/// Received by [`Component::update_all`].
pub struct UpdatePass<'a, C: Component> {
    manager: &'a mut Manager,
    kind: KindId,
    _marker: PhantomData<fn() -> C>,
}

impl<'a, C: Component> UpdatePass<'a, C> {
    fn new(manager: &'a mut Manager) -> Self {
        Self {
            manager,
            kind: kind_of::<C>(),
            _marker: PhantomData,
        }
    }

    /// The kind being updated.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> KindId {
        self.kind
    }

    fn store_mut(&mut self) -> Option<&mut ComponentStore<C>> {
        self.manager.stores.typed_mut::<C>(self.kind)
    }

    /// Number of components in the store.
    #[must_use]
    pub fn len(&mut self) -> usize {
        self.store_mut().map_or(0, |store| store.len())
    }

    /// Checks whether the store is empty or gone.
    #[must_use]
    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Every component with its entity, for batch processing.
    ///
    /// Values can be changed in place; membership cannot. Empty if the
    /// store was deleted during the pass.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut C)> + '_ {
        self.store_mut().into_iter().flat_map(ComponentStore::iter_mut)
    }

    /// The whole manager.
    pub fn manager(&mut self) -> &mut Manager {
        &mut *self.manager
    }

    /// Visits every stored component in index order, calling
    /// [`Component::update`] for each.
    ///
    /// Components appended during the walk are visited in the same walk.
    /// The walk stops early if the store is deleted.
    pub fn for_each(&mut self) {
        let Some(store) = self.store_mut() else {
            return;
        };
        store.begin_pass();

        while let Some(entity) = self.store_mut().and_then(ComponentStore::next_in_pass) {
            if let Some(handle) = self.manager.entity_mut(entity) {
                C::update(handle);
            }
        }

        if let Some(store) = self.store_mut() {
            store.end_pass();
        }
    }
}

/// Runs one tick of kind `C`. Stored type-erased in the store registry.
pub(crate) fn run<C: Component>(manager: &mut Manager) {
    C::update_all(UpdatePass::new(manager));
}
