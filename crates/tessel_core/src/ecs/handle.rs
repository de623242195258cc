//! # Entity Handles
//!
//! Typed access to one entity through its manager.
//!
//! A handle borrows the manager, so it cannot outlive a tick boundary. Hold
//! on to the [`EntityId`] instead and look the entity up again with
//! [`Manager::entity`] or [`Manager::entity_mut`]; the lookup returns `None`
//! once the entity is gone.

use super::component::Component;
use super::entity::{ComponentMask, EntityId};
use super::kind::lookup_kind;
use super::manager::Manager;

/// A set of component kinds queried together, implemented for tuples.
///
/// ```rust
/// use tessel_core::{Component, Manager};
///
/// struct A;
/// impl Component for A {}
/// struct B;
/// impl Component for B {}
///
/// let mut manager = Manager::new();
/// let id = manager.create_entity();
/// let mut entity = manager.entity_mut(id).unwrap();
/// entity.add(A);
/// assert!(!entity.has_all::<(A, B)>());
/// entity.add(B);
/// assert!(entity.has_all::<(A, B)>());
/// ```
pub trait KindSet {
    /// Checks whether every kind in the set is present in `mask`.
    ///
    /// Stops at the first absent kind.
    fn all_in(mask: &ComponentMask) -> bool;
}

macro_rules! impl_kind_set {
    ($($name:ident),+) => {
        impl<$($name: Component),+> KindSet for ($($name,)+) {
            fn all_in(mask: &ComponentMask) -> bool {
                $(lookup_kind::<$name>().is_some_and(|kind| mask.contains(kind)))&&+
            }
        }
    };
}

impl_kind_set!(A);
impl_kind_set!(A, B);
impl_kind_set!(A, B, C);
impl_kind_set!(A, B, C, D);
impl_kind_set!(A, B, C, D, E);
impl_kind_set!(A, B, C, D, E, F);
impl_kind_set!(A, B, C, D, E, F, G);
impl_kind_set!(A, B, C, D, E, F, G, H);

/// Read-only handle to a live entity.
#[derive(Clone, Copy)]
pub struct EntityRef<'a> {
    manager: &'a Manager,
    id: EntityId,
}

impl<'a> EntityRef<'a> {
    pub(crate) fn new(manager: &'a Manager, id: EntityId) -> Self {
        Self { manager, id }
    }

    /// The entity id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The kinds the entity currently has.
    #[must_use]
    pub fn mask(&self) -> ComponentMask {
        self.manager.mask_of(self.id)
    }

    /// Gets the entity's `C` component.
    #[must_use]
    pub fn get<C: Component>(&self) -> Option<&'a C> {
        self.manager.get_component::<C>(self.id)
    }

    /// Checks whether the entity has a `C` component.
    #[must_use]
    pub fn has<C: Component>(&self) -> bool {
        self.manager.has_component::<C>(self.id)
    }

    /// Checks whether the entity has every kind in `Q`.
    #[must_use]
    pub fn has_all<Q: KindSet>(&self) -> bool {
        Q::all_in(&self.mask())
    }
}

/// Mutable handle to an entity.
///
/// Handed to [`Component::update`] for each visited entity. Operations keep
/// working after the entity dies: reads return `None`, writes do nothing.
pub struct EntityMut<'a> {
    manager: &'a mut Manager,
    id: EntityId,
}

impl<'a> EntityMut<'a> {
    pub(crate) fn new(manager: &'a mut Manager, id: EntityId) -> Self {
        Self { manager, id }
    }

    /// The entity id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Checks whether the entity still exists.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.manager.contains(self.id)
    }

    /// The kinds the entity currently has.
    #[must_use]
    pub fn mask(&self) -> ComponentMask {
        self.manager.mask_of(self.id)
    }

    /// Attaches `component`, creating the kind's store on first use.
    ///
    /// If the entity already has a `C`, that one is returned unchanged.
    /// Returns `None` only if the entity no longer exists.
    ///
    /// # Panics
    ///
    /// Panics if `C` cannot be given a kind id (see
    /// [`kind_of`](crate::kind_of)).
    pub fn add<C: Component>(&mut self, component: C) -> Option<&mut C> {
        self.manager.add_component(self.id, component)
    }

    /// Attaches `C::default()`.
    ///
    /// # Panics
    ///
    /// Same as [`EntityMut::add`].
    pub fn add_default<C: Component + Default>(&mut self) -> Option<&mut C> {
        self.add(C::default())
    }

    /// Gets the entity's `C` component.
    #[must_use]
    pub fn get<C: Component>(&self) -> Option<&C> {
        self.manager.get_component::<C>(self.id)
    }

    /// Gets the entity's `C` component mutably.
    pub fn get_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.manager.get_component_mut::<C>(self.id)
    }

    /// Removes the entity's `C` component, if any.
    pub fn remove<C: Component>(&mut self) -> bool {
        self.manager.remove_component::<C>(self.id)
    }

    /// Checks whether the entity has a `C` component.
    #[must_use]
    pub fn has<C: Component>(&self) -> bool {
        self.manager.has_component::<C>(self.id)
    }

    /// Checks whether the entity has every kind in `Q`.
    #[must_use]
    pub fn has_all<Q: KindSet>(&self) -> bool {
        Q::all_in(&self.mask())
    }

    /// Destroys the entity and all of its components.
    ///
    /// # Returns
    ///
    /// `true` if the entity existed.
    pub fn destroy(self) -> bool {
        self.manager.destroy_entity(self.id)
    }

    /// The owning manager, for logic that reaches beyond this entity.
    pub fn manager(&mut self) -> &mut Manager {
        &mut *self.manager
    }

    /// Downgrades to a read-only handle.
    #[must_use]
    pub fn to_ref(&self) -> EntityRef<'_> {
        EntityRef::new(&*self.manager, self.id)
    }
}
