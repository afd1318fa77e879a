//! ctr-export - launcher asset export tool
//!
//! Converts icon/banner images plus title metadata into the launcher's icon
//! (.icn) and banner (.bnr) containers.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use ctr_common::{AppTitle, SmdhFlags, TextureDimension, encode_banner, encode_icon};
use std::path::PathBuf;
use std::time::Duration;

// Use modules from library
use ctr_export::build::{BuildPlan, CompressorConfig};
use ctr_export::{CBMD_EXT, RAW_ICON_EXT, build, inspect, manifest, resources, texture};

#[derive(Parser)]
#[command(name = "ctr-export")]
#[command(about = "Launcher icon and banner asset export tool")]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CompressorArgs {
    /// Compressor executable (LZ11 encoder)
    #[arg(long)]
    compressor: String,

    /// Compressor argument; `{input}`/`{output}` select file mode (repeatable)
    #[arg(long = "compressor-arg", allow_hyphen_values = true)]
    compressor_args: Vec<String>,

    /// Compressor timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,
}

impl CompressorArgs {
    fn config(&self) -> CompressorConfig {
        CompressorConfig {
            command: self.compressor.clone(),
            args: self.compressor_args.clone(),
            timeout: Duration::from_secs(self.timeout),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build icon and banner from a manifest file
    Build {
        /// Path to banner.toml manifest
        #[arg(default_value = "banner.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate manifest without building
    Check {
        /// Path to banner.toml manifest
        #[arg(default_value = "banner.toml")]
        manifest: PathBuf,
    },

    /// Build icon and banner from command-line arguments
    Create {
        long_title: String,
        short_title: String,
        publisher: String,
        /// 24×24 icon image
        icon24: PathBuf,
        /// 48×48 icon image
        icon48: PathBuf,
        /// 256×128 banner image
        banner: PathBuf,
        /// Output .icn file
        icon_output: PathBuf,
        /// Output .bnr file
        banner_output: PathBuf,

        /// Banner sound (BCWAV), copied unchanged
        #[arg(long)]
        audio: Option<PathBuf>,

        /// Directory with tile maps and header.bin
        #[arg(long, default_value = "resources")]
        resources: PathBuf,

        #[command(flatten)]
        compressor: CompressorArgs,
    },

    /// Export a single tiled icon texture
    Icon {
        /// Input PNG/JPG file
        input: PathBuf,

        /// Icon size (24 or 48)
        #[arg(short, long, default_value_t = 48)]
        size: u32,

        /// Output file (default: input with .ctpk extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory with tile maps
        #[arg(long, default_value = "resources")]
        resources: PathBuf,
    },

    /// Export a single CBMD banner (no audio)
    Banner {
        /// Input 256×128 PNG/JPG file
        input: PathBuf,

        /// Output file (default: input with .cbmd extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory with the banner tile map and header.bin
        #[arg(long, default_value = "resources")]
        resources: PathBuf,

        #[command(flatten)]
        compressor: CompressorArgs,
    },

    /// Print the contents of an .icn or .bnr file
    Inspect {
        /// Container to inspect
        input: PathBuf,

        /// Decode icons to PNG into this directory
        #[arg(long)]
        dump: Option<PathBuf>,

        /// Directory with tile maps (for --dump)
        #[arg(long, default_value = "resources")]
        resources: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match cli.command {
        Commands::Build { manifest, output } => {
            tracing::info!("Building assets from {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            build::run_plan(&config.to_plan(output.as_deref()))?;
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Create {
            long_title,
            short_title,
            publisher,
            icon24,
            icon48,
            banner,
            icon_output,
            banner_output,
            audio,
            resources,
            compressor,
        } => {
            let plan = BuildPlan {
                title: AppTitle::new(long_title, short_title, publisher),
                flags: SmdhFlags::default(),
                icon24,
                icon48,
                banner,
                audio,
                resource_dir: resources,
                compressor: compressor.config(),
                icon_output,
                banner_output,
            };
            build::run_plan(&plan)?;
            tracing::info!("Done!");
        }

        Commands::Icon {
            input,
            size,
            output,
            resources,
        } => {
            let Some(dimension) = TextureDimension::icon(size) else {
                anyhow::bail!("Unsupported icon size {} (use 24 or 48)", size);
            };
            let output = output.unwrap_or_else(|| input.with_extension(RAW_ICON_EXT));
            tracing::info!("Converting {:?} -> {:?}", input, output);

            let map = ctr_common::TileAddressMap::load(dimension, &resources)?;
            let image = texture::load_image(&input)?;
            let icon = encode_icon(&image, &map)?;
            build::write_output(&output, &icon.data)?;
            tracing::info!("Done! ({} bytes)", icon.data.len());
        }

        Commands::Banner {
            input,
            output,
            resources: resource_dir,
            compressor,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(CBMD_EXT));
            tracing::info!("Converting {:?} -> {:?}", input, output);

            let map = ctr_common::TileAddressMap::load(TextureDimension::Banner, &resource_dir)?;
            let template = resources::load_header_template(&resource_dir)?;
            let compressor = compressor.config().resolve()?;
            let image = texture::load_image(&input)?;
            let cbmd = encode_banner(&image, &map, &template, &compressor)?;
            build::write_output(&output, cbmd.as_bytes())?;
            tracing::info!("Done! ({} bytes)", cbmd.as_bytes().len());
        }

        Commands::Inspect {
            input,
            dump,
            resources,
        } => {
            inspect::inspect(&input, dump.as_deref(), &resources)?;
        }
    }

    Ok(())
}
