//! Node lists and maintenance output.

use crate::index::{NodeRecord, PruneReport};
use crate::library::SummonOutcome;
use comfy_table::Table;
use serde_json::json;

/// Table of nodes (search hits, trails).
pub fn format_nodes_text(nodes: &[NodeRecord]) -> String {
    if nodes.is_empty() {
        return "No matching nodes.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Path", "Kind", "Node ID"]);
    for node in nodes {
        table.add_row(vec![
            node.path.display().to_string(),
            node.kind.to_string(),
            node.id.to_string(),
        ]);
    }
    table.to_string()
}

pub fn format_nodes_json(nodes: &[NodeRecord]) -> String {
    let items: Vec<_> = nodes
        .iter()
        .map(|node| {
            json!({
                "id": node.id,
                "path": node.path,
                "kind": node.kind,
                "parent": node.parent,
                "theme": node.theme,
                "last_seen": node.last_seen_at().map(|t| t.to_rfc3339()),
            })
        })
        .collect();
    format!("{:#}", serde_json::Value::Array(items))
}

pub fn format_prune_text(report: &PruneReport) -> String {
    format!(
        "Pruned {} orphaned pin(s) and {} orphaned visit record(s).",
        report.pins_removed, report.visits_removed
    )
}

pub fn format_prune_json(report: &PruneReport) -> String {
    format!(
        "{:#}",
        json!({
            "pins_removed": report.pins_removed,
            "visits_removed": report.visits_removed,
        })
    )
}

pub fn format_summon_text(outcome: &SummonOutcome) -> String {
    let mut out = outcome.message.clone();
    for item in &outcome.items {
        out.push_str(&format!("\n  {} ({} bytes)", item.name, item.size));
    }
    out
}

pub fn format_summon_json(outcome: &SummonOutcome) -> String {
    format!(
        "{:#}",
        json!({
            "message": outcome.message,
            "changed": outcome.changed,
            "items": outcome.items,
        })
    )
}
