// particle/mod.rs
// Re-exports for the particle module

mod history;
mod types;

pub use history::PositionHistory;
pub use types::*;

#[cfg(test)]
mod tests;
