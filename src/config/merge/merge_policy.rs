//! Merge rules: defaults, override order, conflict handling.

use crate::scanner::METADATA_FILE_NAME;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Storage paths have no static default; they are resolved at load time.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("layout.radius_divisor", 2.5)?
        .set_default("layout.fill_ratio", 0.9)?
        .set_default("layout.min_dist", 2.0)?
        .set_default("scan.ignore_names", vec![METADATA_FILE_NAME.to_string()])?
        .set_default("logging.level", "warn")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
