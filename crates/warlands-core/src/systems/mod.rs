//! Systems - logic that operates on components

mod combat;
mod movement;
mod smuggler;
mod wandering;

pub use combat::*;
pub use movement::*;
pub use smuggler::*;
pub use wandering::*;
