//! viewfilter core - view-filtered projections of object graphs
//!
//! Given a root value and a set of requested view tags, a [`ViewFilter`]
//! returns a structurally isomorphic copy of the graph in which only fields
//! whose declared tag is compatible with the request keep their value; all
//! other fields are reset to their zero value.
//!
//! - [`tags`]: the view tag lattice and the compatibility check
//! - [`schema`]: class descriptor tables (field metadata)
//! - [`model`]: the object-graph value model
//! - [`selection`]: filtered-class registry and selection state
//! - [`memo`]: per-call identity memo
//! - [`engine`]: the projection engine
//! - [`builder`]: fluent configuration and the one-shot [`project`]
//!
//! ```
//! use std::sync::Arc;
//! use viewfilter_core::{project, FieldType, Schema, TagLattice};
//!
//! let mut tags = TagLattice::builder();
//! let public = tags.define("Public", &[]).unwrap();
//! let secret = tags.define("Secret", &[]).unwrap();
//! let lattice = Arc::new(tags.build());
//!
//! let mut classes = Schema::builder();
//! let account = classes
//!     .class("Account")
//!     .tagged_field("name", FieldType::Reference, public)
//!     .tagged_field("pin", FieldType::Int, secret)
//!     .build()
//!     .unwrap();
//! let schema = Arc::new(classes.build());
//!
//! let value = schema.object(account).with("name", "ada").with("pin", 1234).build().unwrap();
//! let projected = project(&schema, &lattice, &value, &[public]).unwrap();
//!
//! assert_eq!(schema.read(&projected, "name").unwrap().as_str(), Some("ada"));
//! assert_eq!(schema.read(&projected, "pin").unwrap().as_int(), Some(0));
//! ```

pub mod builder;
pub mod demo;
pub mod engine;
pub mod errors;
pub mod logging_facility;
pub mod memo;
pub mod model;
pub mod render;
pub mod schema;
pub mod selection;
pub mod tags;

pub use viewfilter_core_types as core_types;

// Re-export commonly used types
pub use builder::{find_included_fields, project, ViewFilterBuilder};
pub use engine::{ProjectionContext, ViewFilter};
pub use errors::{ExError, ExErrorKind, Result, ViewFilterError};
pub use memo::IdentityMemo;
pub use model::{
    structurally_equal, Container, ContainerKind, ElementType, Object, ObjectArray,
    PrimitiveArray, Shape, Value,
};
pub use render::render_value;
pub use schema::{ClassId, FieldAccess, FieldDescriptor, FieldMetadata, FieldType, Schema};
pub use selection::{FilteredClassRegistry, SelectionState};
pub use tags::{compatible, TagAncestry, TagId, TagLattice};
