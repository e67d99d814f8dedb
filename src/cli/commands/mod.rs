//! CLI command implementations

pub mod build;
pub mod cache;
pub mod list;

pub use build::execute as build;
pub use cache::execute as cache;
pub use list::execute as list;
