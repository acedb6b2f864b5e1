//! The dead librarian: shelves a room's PDFs into its magic library.

use crate::error::WorldError;
use crate::metadata::{ContainerItem, LibraryItem, MetadataStore, DEFAULT_CONTAINER_TYPE};
use std::path::Path;
use tracing::{info, warn};
use walkdir::WalkDir;

pub const LIBRARIAN_NPC: &str = "dead_librarian";
pub const LIBRARY_CONTAINER: &str = "Magic Library";

/// What a summon did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummonOutcome {
    pub message: String,
    pub changed: bool,
    pub items: Vec<LibraryItem>,
}

/// PDFs directly inside `directory`, ordered by lowercase name.
pub fn gather_pdfs(directory: &Path) -> Vec<LibraryItem> {
    let mut items: Vec<LibraryItem> = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            LibraryItem {
                relpath: name.clone(),
                size: entry.metadata().map(|m| m.len()).unwrap_or(0),
                name,
            }
        })
        .collect();
    items.sort_by_key(|item| item.name.to_lowercase());
    items
}

/// Mark the librarian present in `directory` and restock its library.
///
/// Metadata that failed to parse is left untouched.
pub fn summon_librarian(
    directory: &Path,
    store: &dyn MetadataStore,
) -> Result<SummonOutcome, WorldError> {
    let loaded = store.load(directory);
    if loaded.malformed {
        warn!(dir = %directory.display(), "Refusing to summon over malformed metadata");
        return Ok(SummonOutcome {
            message: "The Dead Librarian cannot read this room's records.".to_string(),
            changed: false,
            items: Vec::new(),
        });
    }

    let mut meta = loaded.metadata.clone();
    meta.ensure_npc(LIBRARIAN_NPC).present = true;
    let items = gather_pdfs(directory);
    let library = meta.ensure_container(LIBRARY_CONTAINER);
    library.items = items.iter().cloned().map(ContainerItem::Book).collect();
    library.container_type = DEFAULT_CONTAINER_TYPE.to_string();

    let changed = meta != loaded.metadata;
    if changed {
        store.save(directory, &meta)?;
    }

    let message = if items.is_empty() {
        "Dead Librarian found no tomes to shelve.".to_string()
    } else {
        format!("Dead Librarian archived {} book(s).", items.len())
    };
    info!(dir = %directory.display(), books = items.len(), changed, "Librarian summoned");
    Ok(SummonOutcome {
        message,
        changed,
        items,
    })
}
