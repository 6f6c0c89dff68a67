//! Side-effecting operations: the backing-store contract, its in-memory
//! implementation, admin entry points, and configuration loading.

pub mod config;
pub mod desk;
pub mod memory;
pub mod store;
