// simulation/mod.rs
// Re-exports and module declarations for simulation submodules

pub mod boundary;
pub mod collision;
pub mod forces;
pub mod simulation;
pub mod spawn;
pub use collision::MergeEvent;
pub use simulation::*;
