//! ctr-export library
//!
//! Provides the asset pipeline behind the `ctr-export` binary so other tools
//! (and integration tests) can build icon and banner containers in-process.

pub mod audio;
pub mod build;
pub mod compressor;
pub mod inspect;
pub mod manifest;
pub mod resources;
pub mod texture;

/// Icon container extension
pub const ICON_EXT: &str = "icn";
/// Banner container extension
pub const BANNER_EXT: &str = "bnr";
/// Standalone CBMD extension (banner without audio)
pub const CBMD_EXT: &str = "cbmd";
/// Standalone tiled icon extension
pub const RAW_ICON_EXT: &str = "ctpk";

// Re-export the codec types callers need to drive a build
pub use ctr_common::{AppTitle, CodecError, Compressor, SmdhFlags, SourceImage};

pub use build::{BuildOutputs, BuildPlan, build_outputs, run_plan, write_outputs};
pub use compressor::ExternalCompressor;
pub use resources::ResourceSet;
