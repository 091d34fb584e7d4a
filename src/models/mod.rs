//! Inventory model layer
//!
//! Kind names and object identity shared by the fetch, resolution and
//! rendering code.

mod owner;
mod resource_kind;

pub use owner::{OwnerLink, ResourceRef, controller_of};
pub use resource_kind::ResourceKind;
