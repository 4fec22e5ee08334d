//! CLI command implementations.

pub mod params;
pub mod presets;
pub mod process;
