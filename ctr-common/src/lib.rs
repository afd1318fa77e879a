//! Shared codec for handheld launcher icon and banner assets
//!
//! This crate provides everything needed to turn decoded images into the
//! launcher's binary containers, shared between:
//! - `ctr-export` (asset pipeline and CLI)
//! - tests and tools that need to read the containers back
//!
//! # Modules
//!
//! - [`packing`] - Pixel quantization (RGBA8 → RGB565 / RGBA4444)
//! - [`tiling`] - Tile address maps (row-major → GPU tiled order)
//! - [`encode`] - Icon and banner texture encoders
//! - [`formats`] - SMDH, CBMD, icon and banner containers
//! - [`compress`] - Pluggable compressor interface

pub mod compress;
pub mod encode;
mod error;
pub mod formats;
pub mod packing;
pub mod tiling;

pub use compress::Compressor;
pub use encode::{
    EncodedTexture, SourceImage, encode_banner, encode_banner_texture, encode_icon,
    wrap_banner_texture,
};
pub use error::{CodecError, Result};
pub use formats::{
    AppTitle, BannerFile, CbmdContainer, CbmdHeader, IconFile, MetadataHeader, SmdhFlags,
};
pub use packing::{PixelFormat, Rgba8, quantize};
pub use tiling::{TextureDimension, TileAddressMap};
