//! Build orchestration
//!
//! Loads every input, encodes the four independent pieces in parallel,
//! assembles both containers in memory and only then writes them. Any error
//! aborts the run before the first output byte reaches disk.

use anyhow::{Context, Result};
use ctr_common::formats::{BannerFile, IconFile, MetadataHeader};
use ctr_common::{
    AppTitle, CodecError, Compressor, SmdhFlags, SourceImage, encode_banner, encode_icon,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::compressor::ExternalCompressor;
use crate::resources::ResourceSet;
use crate::{audio, texture};

/// External compressor invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressorConfig {
    pub command: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl CompressorConfig {
    pub fn resolve(&self) -> Result<ExternalCompressor, CodecError> {
        ExternalCompressor::new(&self.command, self.args.clone(), self.timeout)
    }
}

/// Fully resolved inputs and outputs of one build.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub title: AppTitle,
    pub flags: SmdhFlags,
    pub icon24: PathBuf,
    pub icon48: PathBuf,
    pub banner: PathBuf,
    pub audio: Option<PathBuf>,
    pub resource_dir: PathBuf,
    pub compressor: CompressorConfig,
    pub icon_output: PathBuf,
    pub banner_output: PathBuf,
}

/// Decoded inputs for [`build_outputs`].
#[derive(Debug, Clone)]
pub struct BuildInputs {
    pub title: AppTitle,
    pub flags: SmdhFlags,
    pub icon24: SourceImage,
    pub icon48: SourceImage,
    pub banner: SourceImage,
    pub audio: Vec<u8>,
}

/// Both finished containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutputs {
    pub icon: Vec<u8>,
    pub banner: Vec<u8>,
}

/// Encode and assemble both containers in memory.
pub fn build_outputs<C: Compressor + ?Sized>(
    inputs: &BuildInputs,
    resources: &ResourceSet,
    compressor: &C,
) -> Result<BuildOutputs, CodecError> {
    // The title check is cheap; fail on it before spending time on textures.
    inputs.title.validate()?;

    let ((small, large), (header, cbmd)) = rayon::join(
        || {
            rayon::join(
                || encode_icon(&inputs.icon24, &resources.icon24),
                || encode_icon(&inputs.icon48, &resources.icon48),
            )
        },
        || {
            rayon::join(
                || MetadataHeader::build(&inputs.title, inputs.flags),
                || {
                    encode_banner(
                        &inputs.banner,
                        &resources.banner,
                        &resources.header_template,
                        compressor,
                    )
                },
            )
        },
    );
    let (small, large, header, cbmd) = (small?, large?, header?, cbmd?);

    let icon = IconFile::assemble(&header, &small.data, &large.data)?;
    let banner = BannerFile::assemble(&cbmd, &inputs.audio);

    tracing::info!(
        "Assembled icon ({} bytes) and banner ({} bytes CBMD + {} bytes audio)",
        icon.len(),
        cbmd.as_bytes().len(),
        inputs.audio.len()
    );
    Ok(BuildOutputs { icon, banner })
}

/// Write both containers, each through a temporary sibling and a rename.
pub fn write_outputs(outputs: &BuildOutputs, icon_path: &Path, banner_path: &Path) -> Result<()> {
    let staged = [
        stage(icon_path, &outputs.icon)?,
        stage(banner_path, &outputs.banner)?,
    ];
    for (temp, path) in staged.into_iter().zip([icon_path, banner_path]) {
        temp.persist(path)
            .with_context(|| format!("Failed to write output: {:?}", path))?;
        tracing::info!("Wrote {:?}", path);
    }
    Ok(())
}

/// Write a single output file through a temporary sibling.
pub fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    stage(path, data)?
        .persist(path)
        .with_context(|| format!("Failed to write output: {:?}", path))?;
    Ok(())
}

fn stage(path: &Path, data: &[u8]) -> Result<tempfile::NamedTempFile> {
    use std::io::Write;

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
    // Temp files default to 0600; outputs get the usual umask-filtered mode.
    #[cfg_attr(not(unix), allow(unused_mut))]
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut temp = builder
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;
    temp.write_all(data)
        .with_context(|| format!("Failed to stage output: {:?}", path))?;
    Ok(temp)
}

/// Load inputs from disk for `plan`.
pub fn load_inputs(plan: &BuildPlan) -> Result<BuildInputs> {
    Ok(BuildInputs {
        title: plan.title.clone(),
        flags: plan.flags,
        icon24: texture::load_image(&plan.icon24)?,
        icon48: texture::load_image(&plan.icon48)?,
        banner: texture::load_image(&plan.banner)?,
        audio: audio::load_audio(plan.audio.as_deref())?,
    })
}

/// Run a complete build.
pub fn run_plan(plan: &BuildPlan) -> Result<()> {
    tracing::info!("Building '{}'", plan.title.long_title);

    plan.title.validate()?;
    let resources = ResourceSet::load(&plan.resource_dir)
        .with_context(|| format!("Failed to load resources from {:?}", plan.resource_dir))?;
    let compressor = plan.compressor.resolve()?;
    let inputs = load_inputs(plan)?;

    let outputs = build_outputs(&inputs, &resources, &compressor)?;
    write_outputs(&outputs, &plan.icon_output, &plan.banner_output)?;
    Ok(())
}
