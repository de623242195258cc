//! # TESSEL Core
//!
//! Minimal Entity Component System runtime:
//! - Entities are opaque ids with a bitset of the component kinds they hold
//! - Every kind has one dense store and its own per-tick update logic
//! - A tick runs each store in descending priority order
//!
//! ## Mutation Rules
//!
//! 1. **Update logic may mutate anything** - adding, removing and destroying
//!    during a tick never skips or repeats a live component
//! 2. **Masks never lie** - an entity's bit for a kind is set exactly when
//!    that kind's store holds a component for it
//! 3. **Handles are short-lived** - keep an [`EntityId`] across ticks and
//!    look the entity up again
//!
//! ## Example
//!
//! ```rust
//! use tessel_core::{Component, EntityMut, Manager};
//!
//! struct Health(i32);
//!
//! impl Component for Health {
//!     fn update(mut entity: EntityMut<'_>) {
//!         let dead = entity.get_mut::<Health>().is_some_and(|health| {
//!             health.0 -= 1;
//!             health.0 <= 0
//!         });
//!         if dead {
//!             entity.destroy();
//!         }
//!     }
//! }
//!
//! let mut manager = Manager::new();
//! let id = manager.create_entity();
//! manager.add_component(id, Health(2));
//!
//! manager.tick();
//! assert!(manager.contains(id));
//! manager.tick();
//! assert!(!manager.contains(id));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::ManagerConfig;
pub use ecs::{
    kind_name, kind_of, lookup_kind, Component, ComponentMask, ComponentStore, Entity, EntityId,
    EntityMut, EntityRef, EntityRegistry, ErasedStore, KindId, KindRegistry, KindSet, Manager,
    ManagerId, PassFn, StoreRegistry, UpdatePass, DEFAULT_PRIORITY, MAX_KINDS,
};
pub use error::{EcsError, EcsResult};
