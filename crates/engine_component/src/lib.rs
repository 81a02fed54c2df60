//! # engine_component
//!
//! Identity primitives for the entity-component engine. Nothing in here owns
//! component data; it only names things and bounds how many of them exist.
//!
//! This crate provides:
//!
//! - [`Entity`]: lightweight `u64` entity handles and [`EntityAllocator`].
//! - [`ComponentTypeId`]: dense, per-world component kind indices handed out
//!   by [`ComponentTypes`].
//! - [`GroupId`]: group identifiers used for broad-phase filtering and draw
//!   layering.
//! - [`BitMask`]: the 32-bit presence/membership sets stored on entities.
//! - [`Capacity`]: the fixed bounds enforced on kinds and groups.
//! - [`EcsError`]: the error taxonomy shared by the engine crates.
//! - [`RunFlag`]: the shared "keep running" switch read by the frame loop.

pub mod component;
pub mod entity;
pub mod error;
pub mod group;
pub mod mask;
pub mod run;

pub use component::{Capacity, ComponentTypeId, ComponentTypes, MAX_COMPONENTS};
pub use entity::{Entity, EntityAllocator};
pub use error::EcsError;
pub use group::{GroupId, MAX_GROUPS};
pub use mask::{BitMask, ComponentMask, GroupMask};
pub use run::RunFlag;
