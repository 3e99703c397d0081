//! Components - pure data attached to agent entities

mod agents;
mod common;
mod player;

pub use agents::*;
pub use common::*;
pub use player::*;
