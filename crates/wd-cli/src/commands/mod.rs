//! CLI subcommand implementations.

pub mod add;
pub mod list;
pub mod summary;
pub mod sync;
