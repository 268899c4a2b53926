//! View tags and their extension lattice
//!
//! A view tag labels a subset of fields. Tags extend other tags to form a
//! directed acyclic graph: requesting a tag also requests every tag it
//! extends, directly or transitively. The lattice precomputes each tag's
//! ancestor closure when the tag is defined, so compatibility checks at
//! projection time are set lookups.

use std::collections::{BTreeSet, HashMap};

use crate::errors::{Result, ViewFilterError};

/// Handle to a tag defined in a [`TagLattice`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId(u32);

impl TagId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Answers ancestry queries between view tags
pub trait TagAncestry {
    /// True iff `tag` is `ancestor` or extends it transitively.
    ///
    /// # Errors
    ///
    /// Returns `Introspection` when either tag is unknown to the provider.
    fn extends(&self, tag: TagId, ancestor: TagId) -> Result<bool>;

    /// Resolve a tag by name
    fn tag_named(&self, name: &str) -> Option<TagId>;

    /// Name of a tag
    ///
    /// # Errors
    ///
    /// Returns `Introspection` when the tag is unknown to the provider.
    fn tag_name(&self, tag: TagId) -> Result<&str>;
}

/// Decide whether a field declared under `declared` is visible when
/// `requested` tags are asked for.
///
/// True iff at least one requested tag extends (or is) `declared`.
///
/// # Errors
///
/// Propagates provider failures.
pub fn compatible(
    declared: TagId,
    requested: &BTreeSet<TagId>,
    ancestry: &dyn TagAncestry,
) -> Result<bool> {
    for &tag in requested {
        if ancestry.extends(tag, declared)? {
            return Ok(true);
        }
    }
    Ok(false)
}

#[derive(Debug, Clone)]
struct TagNode {
    name: String,
    parents: Vec<TagId>,
    /// Reflexive, transitive closure of `parents`
    ancestors: BTreeSet<TagId>,
}

/// Immutable tag extension graph
#[derive(Debug, Clone, Default)]
pub struct TagLattice {
    nodes: Vec<TagNode>,
    by_name: HashMap<String, TagId>,
}

impl TagLattice {
    pub fn builder() -> TagLatticeBuilder {
        TagLatticeBuilder::default()
    }

    pub fn tag(&self, name: &str) -> Option<TagId> {
        self.by_name.get(name).copied()
    }

    /// Resolve a tag by name
    ///
    /// # Errors
    ///
    /// Returns `UnknownTag` if no tag has that name.
    pub fn require(&self, name: &str) -> Result<TagId> {
        self.tag(name).ok_or_else(|| ViewFilterError::UnknownTag {
            name: name.to_string(),
        })
    }

    pub fn name_of(&self, tag: TagId) -> Option<&str> {
        self.nodes.get(tag.index()).map(|node| node.name.as_str())
    }

    pub fn parents_of(&self, tag: TagId) -> &[TagId] {
        self.nodes
            .get(tag.index())
            .map(|node| node.parents.as_slice())
            .unwrap_or(&[])
    }

    pub fn ancestors_of(&self, tag: TagId) -> Option<&BTreeSet<TagId>> {
        self.nodes.get(tag.index()).map(|node| &node.ancestors)
    }

    /// Every tag, in definition order
    pub fn tags(&self) -> impl Iterator<Item = TagId> + '_ {
        (0..self.nodes.len()).map(|i| TagId(i as u32))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, tag: TagId) -> Result<&TagNode> {
        self.nodes
            .get(tag.index())
            .ok_or_else(|| ViewFilterError::Introspection {
                reason: format!("tag #{} is not defined in this lattice", tag.index()),
            })
    }
}

impl TagAncestry for TagLattice {
    fn extends(&self, tag: TagId, ancestor: TagId) -> Result<bool> {
        self.node(ancestor)?;
        Ok(self.node(tag)?.ancestors.contains(&ancestor))
    }

    fn tag_named(&self, name: &str) -> Option<TagId> {
        self.tag(name)
    }

    fn tag_name(&self, tag: TagId) -> Result<&str> {
        Ok(self.node(tag)?.name.as_str())
    }
}

/// Builder for a [`TagLattice`]
///
/// A tag's parents must already be defined, which keeps the graph acyclic.
#[derive(Debug, Default)]
pub struct TagLatticeBuilder {
    lattice: TagLattice,
}

impl TagLatticeBuilder {
    /// Define a tag extending `parents`
    ///
    /// # Errors
    ///
    /// Returns `DuplicateTag` if the name is taken, or `UnknownTag` if a
    /// parent was not defined by this builder.
    pub fn define(&mut self, name: &str, parents: &[TagId]) -> Result<TagId> {
        if self.lattice.by_name.contains_key(name) {
            return Err(ViewFilterError::DuplicateTag {
                name: name.to_string(),
            });
        }

        let id = TagId(self.lattice.nodes.len() as u32);
        let mut ancestors = BTreeSet::from([id]);
        for parent in parents {
            let node = self.lattice.nodes.get(parent.index()).ok_or_else(|| {
                ViewFilterError::UnknownTag {
                    name: format!("#{}", parent.index()),
                }
            })?;
            ancestors.extend(node.ancestors.iter().copied());
        }

        let mut unique_parents = Vec::with_capacity(parents.len());
        for parent in parents {
            if !unique_parents.contains(parent) {
                unique_parents.push(*parent);
            }
        }

        self.lattice.nodes.push(TagNode {
            name: name.to_string(),
            parents: unique_parents,
            ancestors,
        });
        self.lattice.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn build(self) -> TagLattice {
        self.lattice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> (TagLattice, [TagId; 4]) {
        let mut b = TagLattice::builder();
        let root = b.define("Root", &[]).unwrap();
        let left = b.define("Left", &[root]).unwrap();
        let right = b.define("Right", &[root]).unwrap();
        let both = b.define("Both", &[left, right]).unwrap();
        (b.build(), [root, left, right, both])
    }

    #[test]
    fn test_extends_is_reflexive() {
        let (lattice, tags) = diamond();
        for tag in tags {
            assert!(lattice.extends(tag, tag).unwrap());
        }
    }

    #[test]
    fn test_extends_is_transitive_across_multiple_parents() {
        let (lattice, [root, left, right, both]) = diamond();
        assert!(lattice.extends(both, left).unwrap());
        assert!(lattice.extends(both, right).unwrap());
        assert!(lattice.extends(both, root).unwrap());
        assert!(!lattice.extends(left, right).unwrap());
        assert!(!lattice.extends(root, both).unwrap());
    }

    #[test]
    fn test_compatible_any_requested() {
        let (lattice, [root, left, right, both]) = diamond();
        let requested = BTreeSet::from([left]);
        assert!(compatible(root, &requested, &lattice).unwrap());
        assert!(compatible(left, &requested, &lattice).unwrap());
        assert!(!compatible(right, &requested, &lattice).unwrap());
        assert!(!compatible(both, &requested, &lattice).unwrap());
        assert!(!compatible(root, &BTreeSet::new(), &lattice).unwrap());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut b = TagLattice::builder();
        b.define("A", &[]).unwrap();
        assert!(matches!(
            b.define("A", &[]),
            Err(ViewFilterError::DuplicateTag { .. })
        ));
    }

    #[test]
    fn test_foreign_parent_rejected() {
        let (_, [_, _, _, both]) = diamond();
        let mut b = TagLattice::builder();
        assert!(matches!(
            b.define("Orphan", &[both]),
            Err(ViewFilterError::UnknownTag { .. })
        ));
    }

    #[test]
    fn test_unknown_tag_is_introspection_failure() {
        let (lattice, [root, ..]) = diamond();
        let foreign = TagId(99);
        assert!(matches!(
            lattice.extends(foreign, root),
            Err(ViewFilterError::Introspection { .. })
        ));
    }

    #[test]
    fn test_lookup_by_name() {
        let (lattice, [_, left, ..]) = diamond();
        assert_eq!(lattice.tag("Left"), Some(left));
        assert_eq!(lattice.name_of(left), Some("Left"));
        assert!(lattice.require("Missing").is_err());
        assert_eq!(lattice.len(), 4);
    }
}
