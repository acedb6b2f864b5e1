//! CLI route: single route table and run context. Dispatches to the world
//! generator and index, then to presentation.

use crate::cli::parse::{Commands, OutputFormat};
use crate::cli::presentation::{
    format_generation_json, format_generation_text, format_nodes_json, format_nodes_text,
    format_prune_json, format_prune_text, format_reflow_json, format_reflow_text,
    format_room_json, format_room_text, format_summon_json, format_summon_text, RoomRow,
};
use crate::config::{ConfigLoader, RogueConfig};
use crate::error::WorldError;
use crate::identity::path;
use crate::index::{self, NodeRecord, PersistentIndex, StorageLocation};
use crate::library;
use crate::metadata::JsonMetadataStore;
use crate::nav::LocationSystem;
use crate::scanner::Scanner;
use crate::world::WorldGenerator;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Runtime context for CLI execution: loaded config, opened index, and the
/// world generator built on top of them.
pub struct RunContext {
    config: RogueConfig,
    location: StorageLocation,
    generator: WorldGenerator,
}

impl RunContext {
    /// Load configuration for `workspace_root` and open the index.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, WorldError> {
        let config = ConfigLoader::new(workspace_root.clone())
            .with_file(config_path)
            .load_validated()?;
        Self::from_config(config, &workspace_root)
    }

    pub fn from_config(config: RogueConfig, workspace_root: &Path) -> Result<Self, WorldError> {
        let (primary, fallback) = config.storage.resolve(workspace_root);
        let opened = index::open_with_fallback(&primary, &fallback)?;
        if let StorageLocation::Fallback { wanted, used, .. } = &opened.location {
            warn!(wanted = %wanted.display(), used = %used.display(), "Index opened at fallback location");
        }

        let generator = WorldGenerator::new(
            Arc::new(opened.index),
            Arc::new(JsonMetadataStore::new()),
        )
        .with_scanner(Scanner::with_config(config.scan.scanner_config()))
        .with_scatter_params(config.layout);

        Ok(Self {
            config,
            location: opened.location,
            generator,
        })
    }

    /// Where the index was opened.
    pub fn location(&self) -> &StorageLocation {
        &self.location
    }

    fn index(&self) -> &PersistentIndex {
        self.generator.index()
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands, format: OutputFormat) -> Result<String, WorldError> {
        let output = self.execute_inner(command, format)?;
        self.index().flush()?;
        info!(command = crate::cli::command_name(command), "Command finished");
        Ok(output)
    }

    fn execute_inner(&self, command: &Commands, format: OutputFormat) -> Result<String, WorldError> {
        let json = format == OutputFormat::Json;
        match command {
            Commands::Generate { dir, root } => {
                let report = if *root {
                    self.generator.generate_room(dir, None)?
                } else {
                    self.generator.generate_attached(dir)?
                };
                Ok(if json {
                    format_generation_json(&report)
                } else {
                    format_generation_text(&report)
                })
            }
            Commands::Reflow { dir, include_pins } => {
                let record = self.indexed(dir)?;
                let report = self.generator.reflow_room(&record.id, *include_pins)?;
                Ok(if json {
                    format_reflow_json(&report)
                } else {
                    format_reflow_text(&report)
                })
            }
            Commands::Show { dir } => {
                let record = self.indexed(dir)?;
                let rows = self.room_rows(&record)?;
                Ok(if json {
                    format_room_json(&rows)
                } else {
                    format_room_text(&rows)
                })
            }
            Commands::Search { needle, limit } => {
                let hits = self.index().search_paths_like(needle, *limit)?;
                Ok(if json {
                    format_nodes_json(&hits)
                } else {
                    format_nodes_text(&hits)
                })
            }
            Commands::Pin { path } => {
                let record = self.indexed(path)?;
                let pinned = self.index().toggle_pin(&record.id)?;
                Ok(if json {
                    format!("{:#}", json!({ "id": record.id, "pinned": pinned }))
                } else if pinned {
                    format!("Pinned {}", record.display_name())
                } else {
                    format!("Unpinned {}", record.display_name())
                })
            }
            Commands::Visit { path } => {
                let record = self.indexed(path)?;
                let visit = self.index().visit(&record.id)?;
                Ok(if json {
                    format!("{:#}", json!({ "id": record.id, "count": visit.count, "last": visit.last }))
                } else {
                    format!("Visited {} ({} time(s))", record.display_name(), visit.count)
                })
            }
            Commands::Trail { path } => {
                let record = self.indexed(path)?;
                let trail = LocationSystem::new(self.index()).breadcrumbs(&record.id)?;
                Ok(if json {
                    format_nodes_json(&trail)
                } else {
                    trail
                        .iter()
                        .map(NodeRecord::display_name)
                        .collect::<Vec<_>>()
                        .join(" > ")
                })
            }
            Commands::Summon { dir } => {
                let canonical = path::canonicalize_path(dir)
                    .map_err(|_| WorldError::NotADirectory(dir.clone()))?;
                let outcome =
                    library::summon_librarian(&canonical, self.generator.metadata_store().as_ref())?;
                // Materialize the librarian and the library as room nodes.
                self.generator.generate_attached(&canonical)?;
                Ok(if json {
                    format_summon_json(&outcome)
                } else {
                    format_summon_text(&outcome)
                })
            }
            Commands::Prune => {
                let report = self.index().prune_orphans()?;
                Ok(if json {
                    format_prune_json(&report)
                } else {
                    format_prune_text(&report)
                })
            }
            Commands::Config => {
                if json {
                    serde_json::to_string_pretty(&self.config)
                        .map_err(|e| WorldError::ConfigError(e.to_string()))
                } else {
                    toml::to_string_pretty(&self.config)
                        .map_err(|e| WorldError::ConfigError(e.to_string()))
                }
            }
        }
    }

    /// Look up the indexed node for a user-supplied path.
    fn indexed(&self, target: &Path) -> Result<NodeRecord, WorldError> {
        let canonical = path::canonical_entry_path(target);
        if let Some(record) = self.index().get_node_by_path(&canonical)? {
            return Ok(record);
        }
        // Directories are indexed under their fully resolved path.
        let resolved = path::canonical_or_absolute(target);
        self.index()
            .get_node_by_path(&resolved)?
            .ok_or(WorldError::PathNotIndexed(canonical))
    }

    fn room_rows(&self, dir: &NodeRecord) -> Result<Vec<RoomRow>, WorldError> {
        let index = self.index();
        let mut rows = Vec::new();
        for child in index.children_of(&dir.id)? {
            rows.push(RoomRow {
                name: child.display_name(),
                kind: child.kind,
                transform: index.get_transform(&child.id)?,
                pinned: index.is_pinned(&child.id)?,
                visits: index.get_visit(&child.id)?.map(|v| v.count).unwrap_or(0),
                id: child.id,
            });
        }
        Ok(rows)
    }
}
