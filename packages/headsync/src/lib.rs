#![doc = include_str!("../README.md")]

mod descriptor;
mod error;
mod memory;
mod reconcile;
mod store;
mod sync;

pub mod config;
pub mod jsonld;
pub mod render;
pub mod schema;

pub use crate::descriptor::{AttributeKind, MetadataDescriptor, TagSpec};
pub use crate::error::{ConfigError, Result};
pub use crate::memory::{HeadNode, MemoryHead};
pub use crate::reconcile::{reconcile, Reconciliation};
pub use crate::store::{HeadKey, HeadStore};
pub use crate::sync::{HeadSynchronizer, PageHead};

/// Attribute set on every head element the synchronizer created or adopted.
pub const MANAGED_ATTRIBUTE: &str = "data-headsync";

/// Attribute carrying the page marker of a structured-data script.
pub const MARKER_ATTRIBUTE: &str = "data-headsync-id";

/// The `type` of every structured-data script.
pub const JSON_LD_TYPE: &str = "application/ld+json";
