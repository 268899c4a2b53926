//! Views command
//!
//! Usage: viewfilter views [--json]

use clap::Args;
use serde::Serialize;
use viewfilter_core::demo::UserDomain;
use viewfilter_core::TagLattice;

#[derive(Debug, Args)]
pub struct ViewsArgs {
    /// Print the lattice as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ViewEntry<'a> {
    name: &'a str,
    extends: Vec<&'a str>,
}

fn entries(lattice: &TagLattice) -> Vec<ViewEntry<'_>> {
    lattice
        .tags()
        .filter_map(|tag| {
            let name = lattice.name_of(tag)?;
            let extends = lattice
                .parents_of(tag)
                .iter()
                .filter_map(|parent| lattice.name_of(*parent))
                .collect();
            Some(ViewEntry { name, extends })
        })
        .collect()
}

/// Execute views command
pub fn execute(args: ViewsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let domain = UserDomain::new()?;
    let entries = entries(&domain.lattice);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in entries {
        if entry.extends.is_empty() {
            println!("{}", entry.name);
        } else {
            println!("{} extends {}", entry.name, entry.extends.join(", "));
        }
    }
    Ok(())
}
