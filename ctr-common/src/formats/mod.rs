//! Launcher binary asset formats
//!
//! - [`smdh`] - application metadata header (titles, flags, settings)
//! - [`cbmd`] - compressed banner model container
//! - [`icon`] - icon container (.icn): SMDH + both icons
//! - [`banner`] - banner container (.bnr): CBMD + audio
//!
//! All multi-byte fields are little-endian.

pub mod banner;
pub mod cbmd;
pub mod icon;
pub mod smdh;

pub use banner::*;
pub use cbmd::*;
pub use icon::*;
pub use smdh::*;
