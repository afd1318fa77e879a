//! Manifest parsing
//!
//! Parses banner.toml and turns it into a [`BuildPlan`]. Relative paths are
//! resolved against the manifest's directory.
//!
//! ```toml
//! [app]
//! long_title = "My Application"
//! short_title = "MyApp"
//! publisher = "Developer"
//!
//! [flags]
//! visible = true
//! use_3d = false
//!
//! [assets]
//! icon24 = "icon24.png"
//! icon48 = "icon48.png"
//! banner = "banner.png"
//! audio = "audio.bcwav"
//!
//! [resources]
//! dir = "resources/"
//!
//! [compressor]
//! command = "lz11"
//! args = ["-c", "{input}", "{output}"]
//! timeout_secs = 60
//!
//! [output]
//! icon = "icon.icn"
//! banner = "banner.bnr"
//! ```

use anyhow::{Context, Result};
use ctr_common::{AppTitle, SmdhFlags};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::build::{BuildPlan, CompressorConfig};
use crate::{BANNER_EXT, ICON_EXT, resources};

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub app: AppSection,
    #[serde(default)]
    pub flags: FlagsSection,
    pub assets: AssetsSection,
    #[serde(default)]
    pub resources: ResourcesSection,
    pub compressor: CompressorSection,
    #[serde(default)]
    pub output: OutputSection,

    /// Directory the manifest was loaded from
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Strings written to every language slot
#[derive(Debug, Deserialize)]
pub struct AppSection {
    pub long_title: String,
    pub short_title: String,
    pub publisher: String,
}

/// Launcher flags. Unlisted flags keep the defaults of [`SmdhFlags`].
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FlagsSection {
    pub visible: bool,
    pub auto_boot: bool,
    pub use_3d: bool,
    pub require_eula: bool,
    pub auto_save_on_exit: bool,
    pub extended_banner: bool,
    pub game_ratings: bool,
    pub use_save_data: bool,
    pub record_app_usage: bool,
    pub disable_save_backup: bool,
}

impl Default for FlagsSection {
    fn default() -> Self {
        let d = SmdhFlags::default();
        Self {
            visible: d.visible,
            auto_boot: d.auto_boot,
            use_3d: d.use_3d,
            require_eula: d.require_eula,
            auto_save_on_exit: d.auto_save_on_exit,
            extended_banner: d.extended_banner,
            game_ratings: d.game_ratings,
            use_save_data: d.use_save_data,
            record_app_usage: d.record_app_usage,
            disable_save_backup: d.disable_save_backup,
        }
    }
}

impl From<&FlagsSection> for SmdhFlags {
    fn from(f: &FlagsSection) -> Self {
        SmdhFlags {
            visible: f.visible,
            auto_boot: f.auto_boot,
            use_3d: f.use_3d,
            require_eula: f.require_eula,
            auto_save_on_exit: f.auto_save_on_exit,
            extended_banner: f.extended_banner,
            game_ratings: f.game_ratings,
            use_save_data: f.use_save_data,
            record_app_usage: f.record_app_usage,
            disable_save_backup: f.disable_save_backup,
        }
    }
}

/// Source images and audio
#[derive(Debug, Deserialize)]
pub struct AssetsSection {
    pub icon24: PathBuf,
    pub icon48: PathBuf,
    pub banner: PathBuf,
    #[serde(default)]
    pub audio: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct ResourcesSection {
    #[serde(default = "default_resource_dir")]
    pub dir: PathBuf,
}

impl Default for ResourcesSection {
    fn default() -> Self {
        Self {
            dir: default_resource_dir(),
        }
    }
}

fn default_resource_dir() -> PathBuf {
    PathBuf::from("resources/")
}

#[derive(Debug, Deserialize)]
pub struct CompressorSection {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_icon_output")]
    pub icon: PathBuf,
    #[serde(default = "default_banner_output")]
    pub banner: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            icon: default_icon_output(),
            banner: default_banner_output(),
        }
    }
}

fn default_icon_output() -> PathBuf {
    PathBuf::from("icon").with_extension(ICON_EXT)
}

fn default_banner_output() -> PathBuf {
    PathBuf::from("banner").with_extension(BANNER_EXT)
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let mut manifest: Manifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    manifest.base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok(manifest)
}

impl Manifest {
    fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    /// Turn the manifest into a build plan.
    ///
    /// `output_dir` replaces the directory of both output files.
    pub fn to_plan(&self, output_dir: Option<&Path>) -> BuildPlan {
        let output = |path: &Path| match output_dir {
            Some(dir) => dir.join(path.file_name().unwrap_or(path.as_os_str())),
            None => self.resolve(path),
        };

        BuildPlan {
            title: AppTitle::new(
                self.app.long_title.clone(),
                self.app.short_title.clone(),
                self.app.publisher.clone(),
            ),
            flags: SmdhFlags::from(&self.flags),
            icon24: self.resolve(&self.assets.icon24),
            icon48: self.resolve(&self.assets.icon48),
            banner: self.resolve(&self.assets.banner),
            audio: self.assets.audio.as_deref().map(|p| self.resolve(p)),
            resource_dir: self.resolve(&self.resources.dir),
            compressor: CompressorConfig {
                command: self.compressor.command.clone(),
                args: self.compressor.args.clone(),
                timeout: Duration::from_secs(self.compressor.timeout_secs),
            },
            icon_output: output(&self.output.icon),
            banner_output: output(&self.output.banner),
        }
    }
}

/// Validate a manifest without building
pub fn validate(manifest: &Manifest) -> Result<()> {
    let plan = manifest.to_plan(None);

    plan.title.validate()?;

    let assets = [
        ("icon24", Some(&plan.icon24)),
        ("icon48", Some(&plan.icon48)),
        ("banner", Some(&plan.banner)),
        ("audio", plan.audio.as_ref()),
    ];
    for (name, path) in assets {
        if let Some(path) = path {
            if !path.is_file() {
                anyhow::bail!("Asset '{}' source not found: {:?}", name, path);
            }
        }
    }

    let missing = resources::missing_files(&plan.resource_dir);
    if !missing.is_empty() {
        anyhow::bail!(
            "Resource directory {:?} is missing: {}",
            plan.resource_dir,
            missing.join(", ")
        );
    }

    which::which(&plan.compressor.command).with_context(|| {
        format!(
            "Compressor '{}' not found on PATH",
            plan.compressor.command
        )
    })?;

    if plan.compressor.timeout.is_zero() {
        anyhow::bail!("compressor.timeout_secs must be greater than zero");
    }

    Ok(())
}
