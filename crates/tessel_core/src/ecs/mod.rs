//! # Entity Component System
//!
//! A small single-threaded ECS built around per-kind stores.
//!
//! ## Design Philosophy
//!
//! - Entities are plain ids; their record carries a bitset of held kinds
//! - Each component kind lives in one dense store with its own update logic
//! - Stores tick in descending priority, one kind at a time
//! - Update logic may add, remove and destroy freely mid-tick

mod component;
mod entity;
mod handle;
mod kind;
mod manager;
mod pass;
mod registry;
mod storage;

pub use component::{Component, DEFAULT_PRIORITY};
pub use entity::{ComponentMask, Entity, EntityId, EntityRegistry};
pub use handle::{EntityMut, EntityRef, KindSet};
pub use kind::{kind_name, kind_of, lookup_kind, KindId, KindRegistry, MAX_KINDS};
pub use manager::{Manager, ManagerId};
pub use pass::UpdatePass;
pub use registry::{ErasedStore, PassFn, StoreRegistry};
pub use storage::ComponentStore;
