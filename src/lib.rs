//! tabstore - A deterministic, incremental tab-session restore engine

pub mod cli;
pub mod observability;
pub mod restore;
pub mod scheduler;
pub mod session;
