//! Room-level output: generation, reflow, and room listings.

use crate::types::{NodeId, NodeKind, Transform};
use crate::world::{GenerationReport, ReflowReport};
use comfy_table::Table;
use serde_json::json;

/// One line of `roguefs show`
#[derive(Debug, Clone)]
pub struct RoomRow {
    pub name: String,
    pub kind: NodeKind,
    pub id: NodeId,
    pub transform: Option<Transform>,
    pub pinned: bool,
    pub visits: u64,
}

pub fn format_generation_text(report: &GenerationReport) -> String {
    let mut out = format!(
        "Generated {} ({})\n  children: {} ({} virtual)\n  placed: {}",
        report.path.display(),
        report.dir_id,
        report.children,
        report.virtual_children,
        report.placed
    );
    if report.kept_pinned > 0 {
        out.push_str(&format!("\n  pinned, kept: {}", report.kept_pinned));
    }
    if !report.evicted.is_empty() {
        out.push_str(&format!("\n  evicted: {}", report.evicted.len()));
    }
    if report.chambers {
        out.push_str("\n  layout: chambers");
    }
    if report.metadata_saved || report.effects_applied > 0 {
        out.push_str(&format!(
            "\n  metadata: {} updated",
            usize::from(report.metadata_saved) + report.effects_applied
        ));
    }
    out
}

pub fn format_generation_json(report: &GenerationReport) -> String {
    let value = json!({
        "dir_id": report.dir_id,
        "path": report.path,
        "children": report.children,
        "virtual_children": report.virtual_children,
        "evicted": report.evicted,
        "placed": report.placed,
        "kept_pinned": report.kept_pinned,
        "chambers": report.chambers,
        "effects_applied": report.effects_applied,
        "metadata_saved": report.metadata_saved,
    });
    format!("{:#}", value)
}

pub fn format_reflow_text(report: &ReflowReport) -> String {
    format!(
        "Reflowed {}: placed {} of {} ({} pinned, untouched)",
        report.dir_id, report.placed, report.children, report.skipped_pinned
    )
}

pub fn format_reflow_json(report: &ReflowReport) -> String {
    let value = json!({
        "dir_id": report.dir_id,
        "children": report.children,
        "placed": report.placed,
        "skipped_pinned": report.skipped_pinned,
        "chambers": report.chambers,
    });
    format!("{:#}", value)
}

pub fn format_room_text(rows: &[RoomRow]) -> String {
    if rows.is_empty() {
        return "The room is empty.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Name", "Kind", "Node ID", "Position", "Pinned", "Visits"]);
    for row in rows {
        let position = match &row.transform {
            Some(t) => format!("({:.2}, {:.2})", t.position.x, t.position.y),
            None => "-".to_string(),
        };
        table.add_row(vec![
            row.name.clone(),
            row.kind.to_string(),
            row.id.as_str()[..8].to_string(),
            position,
            if row.pinned { "yes" } else { "" }.to_string(),
            row.visits.to_string(),
        ]);
    }
    table.to_string()
}

pub fn format_room_json(rows: &[RoomRow]) -> String {
    let items: Vec<_> = rows
        .iter()
        .map(|row| {
            json!({
                "name": row.name,
                "kind": row.kind,
                "id": row.id,
                "transform": row.transform,
                "pinned": row.pinned,
                "visits": row.visits,
            })
        })
        .collect();
    format!("{:#}", serde_json::Value::Array(items))
}
