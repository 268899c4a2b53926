//! Fluent configuration and the one-shot `project` entry point

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::engine::{SharedAncestry, SharedMetadata, ViewFilter};
use crate::errors::{Result, ViewFilterError};
use crate::model::Value;
use crate::schema::{ClassId, FieldDescriptor, FieldMetadata, Schema};
use crate::selection::{FilteredClassRegistry, SelectionState};
use crate::tags::{TagId, TagLattice};

/// Chained configuration for a [`ViewFilter`]
///
/// Name lookups are deferred: an unknown class or view name is reported by
/// [`ViewFilterBuilder::build`].
pub struct ViewFilterBuilder {
    metadata: SharedMetadata,
    ancestry: SharedAncestry,
    classes: FilteredClassRegistry,
    views: BTreeSet<TagId>,
    error: Option<ViewFilterError>,
}

impl ViewFilterBuilder {
    pub fn new(metadata: SharedMetadata, ancestry: SharedAncestry) -> Self {
        Self {
            metadata,
            ancestry,
            classes: FilteredClassRegistry::new(),
            views: BTreeSet::new(),
            error: None,
        }
    }

    /// Opt a class (and its subclasses) into filtering
    pub fn for_class(mut self, class: ClassId) -> Self {
        self.classes.register(class);
        self
    }

    pub fn for_classes(mut self, classes: impl IntoIterator<Item = ClassId>) -> Self {
        for class in classes {
            self.classes.register(class);
        }
        self
    }

    pub fn for_class_named(self, name: &str) -> Self {
        match self.metadata.class_named(name) {
            Some(class) => self.for_class(class),
            None => self.fail(ViewFilterError::UnknownClass {
                name: name.to_string(),
            }),
        }
    }

    /// Request a view
    pub fn use_view(mut self, tag: TagId) -> Self {
        self.views.insert(tag);
        self
    }

    pub fn use_views(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.views.extend(tags);
        self
    }

    pub fn use_view_named(self, name: &str) -> Self {
        match self.ancestry.tag_named(name) {
            Some(tag) => self.use_view(tag),
            None => self.fail(ViewFilterError::UnknownTag {
                name: name.to_string(),
            }),
        }
    }

    fn fail(mut self, err: ViewFilterError) -> Self {
        if self.error.is_none() {
            self.error = Some(err);
        }
        self
    }

    /// # Errors
    ///
    /// Returns the first name-resolution error recorded while chaining.
    pub fn build(self) -> Result<ViewFilter> {
        if let Some(err) = self.error {
            return Err(err);
        }
        tracing::debug!(
            filtered_classes = self.classes.len(),
            views = self.views.len(),
            "view filter configured"
        );
        Ok(ViewFilter::from_parts(
            self.metadata,
            self.ancestry,
            SelectionState::new(self.classes, self.views),
        ))
    }
}

/// Project `value` under exactly `tags`, filtering only its own class
///
/// An object's concrete class (and so its subclasses) is opted in; any other
/// class reachable from it passes through unfiltered. Arrays and containers
/// at the root are copied with their elements passed through.
///
/// # Errors
///
/// See [`ViewFilter::apply_to`].
pub fn project(
    schema: &Arc<Schema>,
    lattice: &Arc<TagLattice>,
    value: &Value,
    tags: &[TagId],
) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    let mut builder = ViewFilter::builder(schema.clone(), lattice.clone());
    if let Some(class) = value.class() {
        builder = builder.for_class(class);
    }
    builder
        .use_views(tags.iter().copied())
        .build()?
        .apply_to(value)
}

/// Fields of `class` (own and inherited) that `tags` would keep
///
/// # Errors
///
/// Propagates provider failures.
pub fn find_included_fields<'s>(
    schema: &'s Schema,
    lattice: &TagLattice,
    class: ClassId,
    tags: &[TagId],
) -> Result<Vec<&'s FieldDescriptor>> {
    let selection = SelectionState::new(
        FilteredClassRegistry::new(),
        tags.iter().copied().collect(),
    );
    selection.included_fields(class, schema as &dyn FieldMetadata, lattice)
}
