//! CLI presentation: text and json formatters per command family.

mod room;
mod shared;

pub use room::{
    format_generation_json, format_generation_text, format_reflow_json, format_reflow_text,
    format_room_json, format_room_text, RoomRow,
};
pub use shared::{
    format_nodes_json, format_nodes_text, format_prune_json, format_prune_text,
    format_summon_json, format_summon_text,
};
