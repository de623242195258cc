//! # Component Kind Registry
//!
//! Every distinct component type gets a small integer [`KindId`] in
//! `[0, capacity)`. The id indexes the store table and the per-entity
//! membership bitset, so it must never change once handed out.
//!
//! Two ways to obtain an id:
//! - **Static**: the kind declares `const KIND: Option<u16> = Some(n)` and
//!   claims slot `n` exactly.
//! - **Dynamic**: the kind leaves `KIND` as `None` and receives the highest
//!   free slot on first use. Allocating from the top keeps dynamic kinds out
//!   of the low slots static kinds conventionally use.
//!
//! A static id that lands on a slot a dynamic kind already took is a
//! [`EcsError::KindConflict`]. With [`MAX_KINDS`] slots and dynamic kinds
//! filling from the top, static ids are safe as long as they stay below
//! `MAX_KINDS - <number of dynamic kinds>`; keep them low.
//!
//! The process shares one [`KindRegistry::global`] instance so the same type
//! maps to the same id in every [`Manager`](crate::Manager). Resolved ids are
//! also remembered per thread, so hot lookups skip the registry lock.

use std::any::{type_name, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::OnceLock;

use parking_lot::Mutex;

use super::component::Component;
use crate::error::{EcsError, EcsResult};

/// Maximum number of distinct component kinds.
///
/// Chosen by the integrator: it sizes the membership bitset carried by every
/// entity, so raising it costs `MAX_KINDS / 8` bytes per entity.
pub const MAX_KINDS: usize = 128;

/// Number of `u64` words in a membership bitset.
pub(crate) const MASK_WORDS: usize = MAX_KINDS.div_ceil(64);

/// Small integer identifying a component kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct KindId(u16);

impl KindId {
    /// Creates a kind id from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Returns the id as a table index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Assigns stable ids to component kinds.
pub struct KindRegistry {
    /// Number of slots available.
    capacity: usize,
    /// Type to id table.
    by_type: HashMap<TypeId, KindId>,
    /// Type name per slot, `None` while the slot is free.
    names: Vec<Option<&'static str>>,
}

impl KindRegistry {
    /// Creates a registry with [`MAX_KINDS`] slots.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_KINDS)
    }

    /// Creates a registry with fewer slots than [`MAX_KINDS`].
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or larger than [`MAX_KINDS`].
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            capacity <= MAX_KINDS,
            "Capacity cannot exceed MAX_KINDS ({MAX_KINDS})"
        );

        Self {
            capacity,
            by_type: HashMap::with_capacity(capacity),
            names: vec![None; capacity],
        }
    }

    /// The process-wide registry used by every [`Manager`](crate::Manager).
    pub fn global() -> &'static Mutex<KindRegistry> {
        static GLOBAL: OnceLock<Mutex<KindRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Mutex::new(KindRegistry::new()))
    }

    /// Returns the number of slots.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of kinds registered so far.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.by_type.len()
    }

    /// Registers `C`, returning its id. Calling it again returns the same id.
    ///
    /// # Errors
    ///
    /// - [`EcsError::KindOverflow`] when every slot is taken.
    /// - [`EcsError::KindOutOfRange`] when `C::KIND` is beyond the capacity.
    /// - [`EcsError::KindConflict`] when `C::KIND` names a slot held by
    ///   another type.
    pub fn register<C: Component>(&mut self) -> EcsResult<KindId> {
        self.register_type(TypeId::of::<C>(), type_name::<C>(), C::KIND)
    }

    /// Returns the id of `C` if it has been registered.
    #[must_use]
    pub fn lookup<C: Component>(&self) -> Option<KindId> {
        self.by_type.get(&TypeId::of::<C>()).copied()
    }

    /// Returns the type name registered under `id`.
    #[must_use]
    pub fn name(&self, id: KindId) -> Option<&'static str> {
        self.names.get(id.index()).copied().flatten()
    }

    fn register_type(
        &mut self,
        type_id: TypeId,
        name: &'static str,
        fixed: Option<u16>,
    ) -> EcsResult<KindId> {
        if let Some(&id) = self.by_type.get(&type_id) {
            return Ok(id);
        }

        let id = match fixed {
            Some(raw) => {
                let slot = self.names.get(usize::from(raw)).ok_or(EcsError::KindOutOfRange {
                    id: raw,
                    max: self.capacity,
                })?;
                if let Some(existing) = *slot {
                    return Err(EcsError::KindConflict {
                        id: raw,
                        existing,
                        requested: name,
                    });
                }
                KindId(raw)
            }
            None => {
                let free = self
                    .names
                    .iter()
                    .rposition(Option::is_none)
                    .ok_or(EcsError::KindOverflow { max: self.capacity })?;
                // capacity <= MAX_KINDS, which fits in u16
                KindId(free as u16)
            }
        };

        self.names[id.index()] = Some(name);
        self.by_type.insert(type_id, id);
        tracing::debug!(kind = name, id = id.get(), "registered component kind");
        Ok(id)
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    /// Global ids already resolved on this thread. An id never changes once
    /// assigned, so entries never go stale.
    static RESOLVED: RefCell<HashMap<TypeId, KindId>> = RefCell::new(HashMap::new());
}

fn resolved(type_id: TypeId) -> Option<KindId> {
    RESOLVED.with(|r| r.borrow().get(&type_id).copied())
}

fn remember(type_id: TypeId, id: KindId) {
    RESOLVED.with(|r| {
        r.borrow_mut().insert(type_id, id);
    });
}

/// Returns the global id of `C`, registering it on first use.
///
/// # Panics
///
/// Panics if registration fails. Running out of kind slots or two kinds
/// claiming the same static id is a configuration error with no recovery;
/// call [`Manager::register_kind`](crate::Manager::register_kind) at startup
/// to surface it as a `Result` instead.
#[must_use]
pub fn kind_of<C: Component>() -> KindId {
    let type_id = TypeId::of::<C>();
    if let Some(id) = resolved(type_id) {
        return id;
    }

    let id = match KindRegistry::global().lock().register::<C>() {
        Ok(id) => id,
        Err(err) => panic!("component kind registration failed: {err}"),
    };
    remember(type_id, id);
    id
}

/// Returns the global id of `C` without registering it.
#[must_use]
pub fn lookup_kind<C: Component>() -> Option<KindId> {
    let type_id = TypeId::of::<C>();
    if let Some(id) = resolved(type_id) {
        return Some(id);
    }

    let id = KindRegistry::global().lock().lookup::<C>()?;
    remember(type_id, id);
    Some(id)
}

/// Returns the type name behind a global kind id.
#[must_use]
pub fn kind_name(id: KindId) -> &'static str {
    KindRegistry::global().lock().name(id).unwrap_or("<unregistered>")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Alpha;
    impl Component for Alpha {}

    struct Beta;
    impl Component for Beta {}

    struct Gamma;
    impl Component for Gamma {}

    struct Fixed0;
    impl Component for Fixed0 {
        const KIND: Option<u16> = Some(0);
    }

    struct AlsoFixed0;
    impl Component for AlsoFixed0 {
        const KIND: Option<u16> = Some(0);
    }

    struct Fixed3;
    impl Component for Fixed3 {
        const KIND: Option<u16> = Some(3);
    }

    struct FixedFar;
    impl Component for FixedFar {
        const KIND: Option<u16> = Some(500);
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = KindRegistry::with_capacity(4);
        let first = registry.register::<Alpha>().unwrap();
        let again = registry.register::<Alpha>().unwrap();
        assert_eq!(first, again);
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_dynamic_ids_allocate_from_top() {
        let mut registry = KindRegistry::with_capacity(4);
        assert_eq!(registry.register::<Alpha>().unwrap(), KindId::new(3));
        assert_eq!(registry.register::<Beta>().unwrap(), KindId::new(2));
        assert_eq!(registry.lookup::<Alpha>(), Some(KindId::new(3)));
        assert_eq!(registry.lookup::<Gamma>(), None);
    }

    #[test]
    fn test_overflow_is_reported() {
        let mut registry = KindRegistry::with_capacity(2);
        registry.register::<Alpha>().unwrap();
        registry.register::<Beta>().unwrap();
        assert_eq!(
            registry.register::<Gamma>(),
            Err(EcsError::KindOverflow { max: 2 })
        );
        // already registered kinds still resolve
        assert!(registry.register::<Alpha>().is_ok());
    }

    #[test]
    fn test_static_id_claims_slot() {
        let mut registry = KindRegistry::with_capacity(4);
        assert_eq!(registry.register::<Fixed0>().unwrap(), KindId::new(0));
        assert!(registry.name(KindId::new(0)).unwrap().ends_with("Fixed0"));

        let err = registry.register::<AlsoFixed0>().unwrap_err();
        assert!(matches!(err, EcsError::KindConflict { id: 0, .. }));
    }

    #[test]
    fn test_high_static_id_depends_on_order() {
        let mut registry = KindRegistry::with_capacity(4);
        assert_eq!(registry.register::<Fixed3>().unwrap(), KindId::new(3));
        assert_eq!(registry.register::<Alpha>().unwrap(), KindId::new(2));

        let mut registry = KindRegistry::with_capacity(4);
        assert_eq!(registry.register::<Alpha>().unwrap(), KindId::new(3));
        assert!(matches!(
            registry.register::<Fixed3>(),
            Err(EcsError::KindConflict { id: 3, .. })
        ));
    }

    #[test]
    fn test_static_id_out_of_range() {
        let mut registry = KindRegistry::with_capacity(4);
        assert_eq!(
            registry.register::<FixedFar>(),
            Err(EcsError::KindOutOfRange { id: 500, max: 4 })
        );
    }

    #[test]
    fn test_global_registry_is_stable() {
        let a = kind_of::<Gamma>();
        let b = kind_of::<Gamma>();
        assert_eq!(a, b);
        assert_eq!(lookup_kind::<Gamma>(), Some(a));
        assert!(kind_name(a).ends_with("Gamma"));
    }

    #[test]
    fn test_resolved_ids_agree_across_threads() {
        struct Shared;
        impl Component for Shared {}

        assert_eq!(lookup_kind::<Shared>(), None);
        let here = kind_of::<Shared>();
        let there = std::thread::spawn(|| (lookup_kind::<Shared>(), kind_of::<Shared>()))
            .join()
            .unwrap();

        assert_eq!(there, (Some(here), here));
        assert_eq!(KindRegistry::global().lock().lookup::<Shared>(), Some(here));
        assert_eq!(lookup_kind::<Shared>(), Some(here));
    }
}
