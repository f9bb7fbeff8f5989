//! Utility functions and types

mod parallel;
pub mod data_loader;
pub mod stats;

pub use parallel::ParallelConfig;
pub use data_loader::{DataLoader, DataSaver};
