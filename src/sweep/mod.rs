pub mod sweeper;

pub use sweeper::{CleanupSweeper, SweepReport};
