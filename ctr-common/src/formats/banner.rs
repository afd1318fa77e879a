//! Banner container (.bnr)
//!
//! A CBMD container followed by the banner sound, copied through unchanged.
//!
//! # Layout
//! ```text
//! 0x00: CBMD container (total length from its header)
//! var:  audio payload (BCWAV), to end of file
//! ```

use crate::error::Result;
use crate::formats::cbmd::CbmdContainer;

/// Parsed banner container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerFile {
    pub cbmd: CbmdContainer,
    pub audio: Vec<u8>,
}

impl BannerFile {
    /// Concatenate the container and audio.
    pub fn assemble(cbmd: &CbmdContainer, audio: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(cbmd.as_bytes().len() + audio.len());
        bytes.extend_from_slice(cbmd.as_bytes());
        bytes.extend_from_slice(audio);
        bytes
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let (cbmd, audio) = CbmdContainer::parse(bytes)?;
        Ok(Self {
            cbmd,
            audio: audio.to_vec(),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        Self::assemble(&self.cbmd, &self.audio)
    }
}
