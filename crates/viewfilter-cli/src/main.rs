//! viewfilter CLI
//!
//! Command-line front end for the user-account demo domain

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "viewfilter")]
#[command(about = "viewfilter - View-filtered projections of object graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Project a demo user under one or more views
    Demo(commands::demo::DemoArgs),
    /// List the demo view tags and what they extend
    Views(commands::views::ViewsArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Demo(args) => commands::demo::execute(args),
        Commands::Views(args) => commands::views::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
