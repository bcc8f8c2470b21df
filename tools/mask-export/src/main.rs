//! mask-export - face masking tool for meshes
//!
//! Removes the faces of glTF/OBJ meshes whose UV centroid falls outside a
//! mask texture and writes the result as .maskmesh

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mask_common::{
    AssetId, ColorChannel, ImportMessage, ImportOptions, ImportResults, MaskImporter,
    MaskSetting, WrapMode, DEFAULT_THRESHOLD,
};
use std::path::PathBuf;

use mask_export::formats::{face_count, read_mask_mesh};
use mask_export::{export, manifest, MASK_MESH_EXT};

#[derive(Parser)]
#[command(name = "mask-export")]
#[command(about = "Mask mesh faces with a texture")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every mesh listed in a manifest file
    Build {
        /// Path to masks.toml manifest
        #[arg(default_value = "masks.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without building
    Check {
        /// Path to masks.toml manifest
        #[arg(default_value = "masks.toml")]
        manifest: PathBuf,
    },

    /// Mask a single mesh file, using the same setting for every submesh
    Mesh {
        /// Input mesh file (glTF/GLB/OBJ)
        input: PathBuf,

        /// Output .maskmesh file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Mask image (PNG/JPG); without one every face is kept
        #[arg(short, long)]
        mask: Option<PathBuf>,

        /// Color channel compared against the threshold
        #[arg(short, long, value_enum, default_value = "alpha")]
        channel: ChannelArg,

        /// Keep faces whose channel value is above this
        #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f32,

        /// Keep faces at or below the threshold instead
        #[arg(long)]
        invert: bool,

        /// UV channel used to sample the mask
        #[arg(long, default_value_t = 0)]
        uv_channel: u8,

        /// Texture wrap mode for UVs outside [0, 1]
        #[arg(long, value_enum, default_value = "repeat")]
        wrap: WrapArg,

        /// Keep submesh bounds from the source mesh
        #[arg(long)]
        keep_original_bounds: bool,

        /// Keep vertices no face references any more
        #[arg(long)]
        skip_optimization: bool,
    },

    /// Print the contents of a .maskmesh file
    Inspect {
        /// Input .maskmesh file
        input: PathBuf,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ChannelArg {
    Red,
    Green,
    Blue,
    Alpha,
}

impl From<ChannelArg> for ColorChannel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Red => ColorChannel::Red,
            ChannelArg::Green => ColorChannel::Green,
            ChannelArg::Blue => ColorChannel::Blue,
            ChannelArg::Alpha => ColorChannel::Alpha,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum WrapArg {
    Repeat,
    Clamp,
    Mirror,
}

impl From<WrapArg> for WrapMode {
    fn from(arg: WrapArg) -> Self {
        match arg {
            WrapArg::Repeat => WrapMode::Repeat,
            WrapArg::Clamp => WrapMode::Clamp,
            WrapArg::Mirror => WrapMode::Mirror,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            manifest,
            output,
            verbose,
        } => {
            if verbose {
                tracing::info!("Building masked meshes from {:?}", manifest);
            }
            let config = manifest::load_manifest(&manifest)?;
            let results = manifest::build_all(&config, output.as_deref())?;
            if verbose {
                print_results(&results, config.meshes.keys());
            }
            report_failures(&results)?;
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Mesh {
            input,
            output,
            mask,
            channel,
            threshold,
            invert,
            uv_channel,
            wrap,
            keep_original_bounds,
            skip_optimization,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(MASK_MESH_EXT));
            tracing::info!("Masking {:?} -> {:?}", input, output);

            let source = export::MaskSource {
                setting: MaskSetting {
                    mask,
                    color_channel: channel.into(),
                    threshold,
                    invert,
                    uv_channel,
                },
                wrap: wrap.into(),
            };
            source.setting.validate()?;

            let asset = AssetId::new(input.to_string_lossy());
            let mesh = export::load_source(&asset, &input);

            // One setting for every submesh
            let submesh_count = mesh.as_ref().map_or(0, |m| m.submeshes.len());
            let (setting, error) = export::load_setting(&source);
            let warnings: Vec<_> = error
                .into_iter()
                .map(|err| {
                    ImportMessage::warning(format!(
                        "{err:#}; every submesh treated as having no mask"
                    ))
                })
                .collect();
            let settings = vec![setting; submesh_count];

            let mut importer = MaskImporter::new();
            let written = export::export_mesh(
                &mut importer,
                &asset,
                mesh.as_ref(),
                &settings,
                warnings,
                ImportOptions {
                    keep_original_bounds,
                    skip_mesh_optimization: skip_optimization,
                },
                &output,
            )?;
            report_failures(importer.results())?;
            if !written {
                anyhow::bail!("Nothing was written for {:?}", input);
            }
            tracing::info!("Done!");
        }

        Commands::Inspect { input } => {
            let bytes =
                std::fs::read(&input).with_context(|| format!("Failed to read {:?}", input))?;
            let name = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mesh = read_mask_mesh(&bytes, name)?;

            println!("{}", mesh.name);
            println!("  vertices: {}", mesh.positions.len());
            println!("  normals: {}", mesh.normals.is_some());
            println!("  colors: {}", mesh.colors.is_some());
            println!("  uv channels: {:#010b}", mesh.uv_channel_mask());
            for (i, sub) in mesh.submeshes.iter().enumerate() {
                println!(
                    "  submesh {}: {} x{} ({} indices, base vertex {}, bounds {:?}..{:?})",
                    i,
                    sub.topology,
                    face_count(sub.topology, sub.indices.len()),
                    sub.indices.len(),
                    sub.base_vertex,
                    sub.bounds.min.to_array(),
                    sub.bounds.max.to_array()
                );
            }
        }
    }

    Ok(())
}

/// Print the latest import lines of each asset.
fn print_results<'a>(results: &ImportResults, names: impl Iterator<Item = &'a String>) {
    let mut names: Vec<_> = names.collect();
    names.sort();
    for name in names {
        if let Some(messages) = results.latest(&AssetId::new(name.as_str())) {
            println!("{}:", name);
            for message in messages {
                println!("  {}", message);
            }
        }
    }
}

fn report_failures(results: &ImportResults) -> Result<()> {
    let mut failed: Vec<_> = results.failed_assets().map(AssetId::as_str).collect();
    if failed.is_empty() {
        return Ok(());
    }
    failed.sort_unstable();
    anyhow::bail!("Masking reported errors for: {}", failed.join(", "))
}
