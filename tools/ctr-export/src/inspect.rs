//! Inspect built containers
//!
//! Prints what an .icn or .bnr file contains and can decode the icon textures
//! back to PNG for a visual check.

use anyhow::{Context, Result};
use ctr_common::formats::{BannerFile, IconFile, CBMD_MAGIC, SMDH_MAGIC};
use ctr_common::{EncodedTexture, PixelFormat, TextureDimension, TileAddressMap};
use std::path::Path;

use crate::texture;

/// Inspect a container; `dump` decodes icons into that directory (needs maps).
pub fn inspect(path: &Path, dump: Option<&Path>, resource_dir: &Path) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read container: {:?}", path))?;

    match bytes.get(0..4) {
        Some(magic) if magic == SMDH_MAGIC => inspect_icon(&bytes, dump, resource_dir),
        Some(magic) if magic == CBMD_MAGIC => inspect_banner(&bytes),
        _ => anyhow::bail!("{:?} is neither an icon (SMDH) nor a banner (CBMD)", path),
    }
}

fn inspect_icon(bytes: &[u8], dump: Option<&Path>, resource_dir: &Path) -> Result<()> {
    let icon = IconFile::parse(bytes)?;
    let title = icon.header.title(0).unwrap_or_default();
    let flags = icon.header.flags();

    println!("Icon container ({} bytes)", bytes.len());
    println!("  Long title:  {}", title.long_title);
    println!("  Short title: {}", title.short_title);
    println!("  Publisher:   {}", title.publisher);
    println!("  Flags:       {:?}", flags);

    if let Some(dir) = dump {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create dump directory: {:?}", dir))?;
        for (dimension, data) in [
            (TextureDimension::Icon24, &icon.small_icon),
            (TextureDimension::Icon48, &icon.large_icon),
        ] {
            let map = TileAddressMap::load(dimension, resource_dir)?;
            let texture = EncodedTexture {
                dimension,
                format: PixelFormat::Rgb565,
                data: data.clone(),
            };
            let out = dir.join(format!("{}.png", dimension.name()));
            texture::save_png(&texture.decode(&map)?, &out)?;
            println!("  Decoded {} -> {:?}", dimension.name(), out);
        }
    }
    Ok(())
}

fn inspect_banner(bytes: &[u8]) -> Result<()> {
    let banner = BannerFile::parse(bytes)?;
    let header = banner.cbmd.header();

    println!("Banner container ({} bytes)", bytes.len());
    println!(
        "  CBMD:  {} bytes ({} byte payload incl. padding)",
        header.total_length,
        header.payload_len()
    );
    println!("  Audio: {} bytes", banner.audio.len());
    Ok(())
}
