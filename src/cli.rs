//! CLI domain: parse, route, output, and presentation only.
//! World logic lives in the library; the route table just dispatches.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, OutputFormat};
pub use route::RunContext;
