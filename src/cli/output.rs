//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::WorldError;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &WorldError) -> String {
    match e {
        WorldError::PathNotIndexed(path) => format!(
            "{} is not indexed yet; run `roguefs generate` on its directory first",
            path.display()
        ),
        other => other.to_string(),
    }
}
