//! Command names used for log fields.

use crate::cli::parse::Commands;

pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Generate { .. } => "generate",
        Commands::Reflow { .. } => "reflow",
        Commands::Show { .. } => "show",
        Commands::Search { .. } => "search",
        Commands::Pin { .. } => "pin",
        Commands::Visit { .. } => "visit",
        Commands::Trail { .. } => "trail",
        Commands::Summon { .. } => "summon",
        Commands::Prune => "prune",
        Commands::Config => "config",
    }
}
