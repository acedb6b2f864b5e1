//! Integration tests for RogueFS world generation

mod test_utils;

mod config_integration;
mod index_integration;
mod pins;
mod reconciliation;
mod world_generation;
