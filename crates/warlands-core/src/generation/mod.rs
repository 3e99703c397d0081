//! Generation - procedural terrain, settlements and population

mod names;
mod population;
mod world;

pub use names::*;
pub use population::*;
pub use world::*;
