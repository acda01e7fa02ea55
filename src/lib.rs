//! Fires Coordinator - session-context engine for a fires planning trainer

pub mod core;
pub mod directive;
pub mod fires;
pub mod import;
pub mod inventory;
pub mod llm;
pub mod map;
pub mod session;
