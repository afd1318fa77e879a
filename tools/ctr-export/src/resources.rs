//! Resource directory loading
//!
//! A resource directory holds the platform data the encoders need but cannot
//! derive: one tile address map per texture size and the banner model header
//! template.
//!
//! ```text
//! resources/
//!   map24x24.bin
//!   map48x48.bin
//!   map256x128.bin
//!   header.bin
//! ```

use std::path::Path;

use ctr_common::{CodecError, TextureDimension, TileAddressMap};

/// Banner model header template file name.
pub const HEADER_TEMPLATE_FILE: &str = "header.bin";

/// Every resource a full build needs, loaded up front.
#[derive(Debug, Clone)]
pub struct ResourceSet {
    pub icon24: TileAddressMap,
    pub icon48: TileAddressMap,
    pub banner: TileAddressMap,
    pub header_template: Vec<u8>,
}

impl ResourceSet {
    /// Load all maps and the header template from `dir`.
    pub fn load(dir: &Path) -> Result<Self, CodecError> {
        let resources = Self {
            icon24: TileAddressMap::load(TextureDimension::Icon24, dir)?,
            icon48: TileAddressMap::load(TextureDimension::Icon48, dir)?,
            banner: TileAddressMap::load(TextureDimension::Banner, dir)?,
            header_template: load_header_template(dir)?,
        };
        tracing::debug!(
            "Loaded resources from {:?} (header template {} bytes)",
            dir,
            resources.header_template.len()
        );
        Ok(resources)
    }
}

/// Read `header.bin` from `dir`. An empty template counts as malformed.
pub fn load_header_template(dir: &Path) -> Result<Vec<u8>, CodecError> {
    let path = dir.join(HEADER_TEMPLATE_FILE);
    let bytes = std::fs::read(&path).map_err(|source| CodecError::ResourceIo {
        path: path.clone(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(CodecError::Resource {
            resource: path.display().to_string(),
            reason: "header template is empty".into(),
        });
    }
    Ok(bytes)
}

/// Check that every resource file is present without parsing it.
pub fn missing_files(dir: &Path) -> Vec<String> {
    TextureDimension::ALL
        .iter()
        .map(|d| d.map_file_name())
        .chain(std::iter::once(HEADER_TEMPLATE_FILE))
        .filter(|name| !dir.join(name).is_file())
        .map(str::to_string)
        .collect()
}
