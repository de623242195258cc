//! # Component Kinds
//!
//! A component is plain data attached to an entity. Its kind also carries
//! the behaviour the runtime invokes for it: a tick priority, lifecycle hooks
//! and the per-tick update logic.

use super::entity::EntityId;
use super::handle::EntityMut;
use super::pass::UpdatePass;

/// Priority used by kinds that do not declare one. Runs first.
pub const DEFAULT_PRIORITY: u32 = u32::MAX;

/// Trait implemented by every component kind.
///
/// All items have defaults, so a pure data kind is a one-line impl:
///
/// ```rust
/// use tessel_core::Component;
///
/// struct Tag;
/// impl Component for Tag {}
/// ```
///
/// Kinds with behaviour override [`Component::update`] (per element) or
/// [`Component::update_all`] (whole store):
///
/// ```rust
/// use tessel_core::{Component, EntityMut};
///
/// struct Health(i32);
///
/// impl Component for Health {
///     const PRIORITY: u32 = 0;
///
///     fn update(entity: EntityMut<'_>) {
///         if entity.get::<Health>().is_some_and(|h| h.0 <= 0) {
///             entity.destroy();
///         }
///     }
/// }
/// ```
pub trait Component: Sized + 'static {
    /// Static kind id, or `None` to be numbered on first use.
    ///
    /// Dynamic kinds take the highest free slot, so a static id near
    /// [`MAX_KINDS`](crate::MAX_KINDS) may already be taken by the time its
    /// kind is first used, which panics with a kind conflict. Keep static
    /// ids low.
    const KIND: Option<u16> = None;

    /// Tick priority. Higher runs earlier; equal priorities run in the order
    /// their stores were created.
    const PRIORITY: u32 = DEFAULT_PRIORITY;

    /// Called right after the component is stored for `entity`.
    fn on_add(&mut self, _entity: EntityId) {}

    /// Called right before the component is erased from its store.
    fn on_remove(&mut self, _entity: EntityId) {}

    /// Per-element update, called once per stored component each tick.
    ///
    /// The handle reaches the visited component through
    /// `entity.get_mut::<Self>()` and may remove it, destroy the entity, add
    /// components or touch other kinds. Every change is visible immediately.
    fn update(_entity: EntityMut<'_>) {}

    /// Whole-store update, called once per tick.
    ///
    /// The default walks the store with [`UpdatePass::for_each`]. Override it
    /// to batch-process the store instead.
    fn update_all(mut pass: UpdatePass<'_, Self>) {
        pass.for_each();
    }
}
