//! Data models for the dance viewer
//!
//! Plain serde types for the four JSON resources. They are treated as
//! input data: loaded once, never mutated in place.

pub mod dance;
pub mod formation;
pub mod role_set;
pub mod serde_helpers;
pub mod setlist;

pub use dance::{Call, Dance, Structure};
pub use formation::Formation;
pub use role_set::{RoleMapping, RoleSet};
pub use setlist::{RawSetlist, Setlist, SetlistItem};
