pub mod demo;
pub mod views;

use viewfilter_core::TagLattice;

/// Resolve a view name against the lattice, ignoring ASCII case
///
/// Unmatched names are returned as given so the builder reports them.
pub fn canonical_view_name<'a>(lattice: &'a TagLattice, name: &'a str) -> &'a str {
    lattice
        .tags()
        .filter_map(|tag| lattice.name_of(tag))
        .find(|candidate| candidate.eq_ignore_ascii_case(name))
        .unwrap_or(name)
}
