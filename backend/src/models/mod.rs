//! Data models for the status board.
//!
//! Field names match the dashboard front end's JSON contract.

mod document;
mod entity;
mod history;

pub use document::*;
pub use entity::*;
pub use history::*;
