//! Environment sources: `ROGUEFS__SECTION__KEY` overrides and `ROGUEFS_DB`

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment};

/// Shortcut variable for the index location.
pub const DB_ENV_VAR: &str = "ROGUEFS_DB";

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix("ROGUEFS")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );
    match std::env::var(DB_ENV_VAR) {
        Ok(path) if !path.is_empty() => builder.set_override("storage.index_path", path),
        _ => Ok(builder),
    }
}
