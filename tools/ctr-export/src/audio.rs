//! Banner audio (BCWAV) pass-through
//!
//! The banner sound is copied into the container byte for byte. Transcoding
//! from WAV is not done here.

use anyhow::{Context, Result};
use std::path::Path;

/// Read the banner sound, or an empty payload when none is configured.
pub fn load_audio(path: Option<&Path>) -> Result<Vec<u8>> {
    let Some(path) = path else {
        tracing::warn!("No banner audio configured, banner will be silent");
        return Ok(Vec::new());
    };

    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read audio: {:?}", path))?;
    if bytes.get(0..4) != Some(b"CWAV".as_slice()) {
        tracing::warn!("{:?} does not start with CWAV magic, copying anyway", path);
    }
    tracing::debug!("Loaded audio {:?}: {} bytes", path, bytes.len());
    Ok(bytes)
}
