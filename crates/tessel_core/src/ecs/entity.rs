//! # Entity Management
//!
//! Entities are opaque identities. The record kept for each one holds:
//! - A process-unique id, never reused within a run
//! - A token naming the owning manager
//! - A bitset of the component kinds currently stored for it

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::kind::{KindId, MASK_WORDS};
use super::manager::ManagerId;
use super::registry::StoreRegistry;

/// Source of entity ids, shared by every manager in the process. Zero is
/// never handed out.
static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an entity.
///
/// Ids are handed out by one process-wide monotonic counter that starts
/// after zero, so [`EntityId::NULL`] never names a live entity and no two
/// managers ever share an id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Null/invalid entity ID.
    pub const NULL: Self = Self(0);

    /// Creates an entity id from its raw value.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Fixed-size bitset of component kinds, one bit per [`KindId`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ComponentMask {
    words: [u64; MASK_WORDS],
}

impl ComponentMask {
    /// The empty mask.
    pub const EMPTY: Self = Self {
        words: [0; MASK_WORDS],
    };

    /// Checks whether `kind` is set.
    #[inline]
    #[must_use]
    pub const fn contains(&self, kind: KindId) -> bool {
        let index = kind.index();
        (self.words[index / 64] & (1u64 << (index % 64))) != 0
    }

    /// Sets the bit for `kind`.
    #[inline]
    pub fn insert(&mut self, kind: KindId) {
        let index = kind.index();
        self.words[index / 64] |= 1u64 << (index % 64);
    }

    /// Clears the bit for `kind`.
    #[inline]
    pub fn remove(&mut self, kind: KindId) {
        let index = kind.index();
        self.words[index / 64] &= !(1u64 << (index % 64));
    }

    /// Checks whether no bit is set.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Returns the number of set bits.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterates over the set kinds in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = KindId> + '_ {
        self.words.iter().enumerate().flat_map(|(word_index, &word)| {
            (0..64u16)
                .filter(move |&bit| word & (1u64 << bit) != 0)
                // word_index < MASK_WORDS, so the product fits MAX_KINDS
                .map(move |bit| KindId::new(word_index as u16 * 64 + bit))
        })
    }
}

/// Identity record for a live entity.
///
/// The record never holds component data; the mask only says which stores
/// hold something for it.
#[derive(Clone, Copy, Debug)]
pub struct Entity {
    /// The unique identifier for this entity.
    pub(crate) id: EntityId,
    /// The manager that owns this entity.
    pub(crate) owner: ManagerId,
    /// Kinds currently stored for this entity.
    pub(crate) mask: ComponentMask,
}

impl Entity {
    /// Creates a record with an empty mask.
    #[inline]
    #[must_use]
    pub const fn new(id: EntityId, owner: ManagerId) -> Self {
        Self {
            id,
            owner,
            mask: ComponentMask::EMPTY,
        }
    }

    /// Returns the entity id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the owning manager's token.
    #[inline]
    #[must_use]
    pub const fn owner(&self) -> ManagerId {
        self.owner
    }

    /// Returns the membership mask.
    #[inline]
    #[must_use]
    pub const fn mask(&self) -> ComponentMask {
        self.mask
    }

    /// Checks if this entity has a component of `kind`.
    #[inline]
    #[must_use]
    pub const fn has_component(&self, kind: KindId) -> bool {
        self.mask.contains(kind)
    }
}

/// Owns every entity record of one manager.
pub struct EntityRegistry {
    /// Live records by id.
    entities: HashMap<EntityId, Entity>,
}

impl EntityRegistry {
    /// Creates an empty registry with room for `capacity` entities.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: HashMap::with_capacity(capacity),
        }
    }

    /// Returns the number of live entities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Checks whether there are no live entities.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Allocates the next id and stores a fresh record for it.
    pub fn create(&mut self, owner: ManagerId) -> EntityId {
        let id = EntityId(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed));
        self.entities.insert(id, Entity::new(id, owner));
        tracing::trace!(entity = id.raw(), "created entity");
        id
    }

    /// Allocates `count` entities with ascending ids.
    pub fn create_many(&mut self, owner: ManagerId, count: usize) -> Vec<EntityId> {
        self.entities.reserve(count);
        (0..count).map(|_| self.create(owner)).collect()
    }

    /// Checks whether `id` names a live entity.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Gets a live record.
    ///
    /// Returns `None` if the id was never allocated or has been destroyed.
    #[inline]
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Gets a live record mutably.
    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Returns every live id in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.entities.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Destroys an entity and every component it holds.
    ///
    /// Each kind set in the mask is removed from its store (running that
    /// kind's `on_remove` hook) before the record is erased.
    ///
    /// # Returns
    ///
    /// `true` if the entity was destroyed, `false` if it was not live.
    pub fn destroy(&mut self, id: EntityId, stores: &mut StoreRegistry) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };

        let mask = entity.mask;
        for kind in mask.iter() {
            if let Some(store) = stores.get_mut(kind) {
                store.remove_entity(id);
            }
            entity.mask.remove(kind);
        }

        self.entities.remove(&id);
        tracing::trace!(entity = id.raw(), "destroyed entity");
        true
    }

    /// Clears `kind` from every entity. Used when a store is deleted.
    pub(crate) fn clear_kind(&mut self, kind: KindId, ids: &[EntityId]) {
        for id in ids {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.mask.remove(kind);
            }
        }
    }
}
