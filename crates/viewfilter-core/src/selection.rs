//! Filtering opt-in policy and the per-filter selection state

use std::collections::BTreeSet;

use crate::errors::Result;
use crate::schema::{ClassId, FieldDescriptor, FieldMetadata};
use crate::tags::{compatible, TagAncestry, TagId};

/// Classes opted into filtering
///
/// A class is filtered if it or any ancestor is registered. Instances of
/// every other class pass through a projection by reference, unfiltered,
/// even when reachable from a filtered object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredClassRegistry {
    classes: BTreeSet<ClassId>,
}

impl FilteredClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the class was already registered
    pub fn register(&mut self, class: ClassId) -> bool {
        self.classes.insert(class)
    }

    pub fn contains(&self, class: ClassId) -> bool {
        self.classes.contains(&class)
    }

    /// # Errors
    ///
    /// Propagates provider failures while walking the class hierarchy.
    pub fn is_filtered(&self, class: ClassId, metadata: &dyn FieldMetadata) -> Result<bool> {
        let mut current = Some(class);
        while let Some(id) = current {
            if self.classes.contains(&id) {
                return Ok(true);
            }
            current = metadata.parent_of(id)?;
        }
        Ok(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.classes.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Filtered classes plus requested views; read-only while projecting
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    filtered: FilteredClassRegistry,
    views: BTreeSet<TagId>,
}

impl SelectionState {
    pub fn new(filtered: FilteredClassRegistry, views: BTreeSet<TagId>) -> Self {
        Self { filtered, views }
    }

    pub fn filtered(&self) -> &FilteredClassRegistry {
        &self.filtered
    }

    pub fn views(&self) -> &BTreeSet<TagId> {
        &self.views
    }

    /// Whether a field keeps its value under the requested views
    ///
    /// # Errors
    ///
    /// Propagates ancestry provider failures.
    pub fn includes(&self, field: &FieldDescriptor, ancestry: &dyn TagAncestry) -> Result<bool> {
        match field.tag() {
            Some(tag) => compatible(tag, &self.views, ancestry),
            None => Ok(false),
        }
    }

    /// Fields of `class` (and its ancestors) that the requested views keep
    ///
    /// # Errors
    ///
    /// Propagates provider failures.
    pub fn included_fields<'m>(
        &self,
        class: ClassId,
        metadata: &'m dyn FieldMetadata,
        ancestry: &dyn TagAncestry,
    ) -> Result<Vec<&'m FieldDescriptor>> {
        let mut included = Vec::new();
        for field in metadata.fields_of(class)? {
            if self.includes(field, ancestry)? {
                included.push(field);
            }
        }
        Ok(included)
    }
}
