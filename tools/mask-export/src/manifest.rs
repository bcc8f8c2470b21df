//! Manifest parsing and build orchestration
//!
//! Parses masks.toml and runs the mask pass for every listed mesh.

use anyhow::{Context, Result};
use mask_common::{
    AssetId, ColorChannel, ImportMessage, ImportOptions, ImportResults, MaskImporter, MaskSetting,
    SettingError, WrapMode, DEFAULT_THRESHOLD, MASK_MESH_EXT,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::export::{export_mesh, load_settings, load_source, MaskSource};

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub meshes: HashMap<String, MeshEntry>,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("masked/")
}

#[derive(Debug, Deserialize)]
pub struct MeshEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub keep_original_bounds: bool,
    #[serde(default)]
    pub skip_mesh_optimization: bool,
    /// One entry per submesh, in submesh order.
    #[serde(default)]
    pub submeshes: Vec<SubmeshEntry>,
}

impl MeshEntry {
    pub fn options(&self) -> ImportOptions {
        ImportOptions {
            keep_original_bounds: self.keep_original_bounds,
            skip_mesh_optimization: self.skip_mesh_optimization,
        }
    }

    pub fn mask_sources(&self) -> Vec<MaskSource> {
        self.submeshes.iter().map(SubmeshEntry::to_source).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmeshEntry {
    #[serde(default)]
    pub mask: Option<PathBuf>,
    #[serde(default)]
    pub color_channel: ColorChannel,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    #[serde(default)]
    pub invert: bool,
    #[serde(default)]
    pub uv_channel: u8,
    #[serde(default)]
    pub wrap: WrapMode,
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

impl SubmeshEntry {
    pub fn to_source(&self) -> MaskSource {
        MaskSource {
            setting: MaskSetting {
                mask: self.mask.clone(),
                color_channel: self.color_channel,
                threshold: self.threshold,
                invert: self.invert,
                uv_channel: self.uv_channel,
            },
            wrap: self.wrap,
        }
    }
}

/// Problem found by [`validate`].
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Mesh '{name}' source not found: {path:?}")]
    MissingSource { name: String, path: PathBuf },

    #[error("Mesh '{name}' submesh {submesh} mask not found: {path:?}")]
    MissingMask {
        name: String,
        submesh: usize,
        path: PathBuf,
    },

    #[error("Mesh '{name}' submesh {submesh}: {source}")]
    Setting {
        name: String,
        submesh: usize,
        source: SettingError,
    },
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let manifest: Manifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    Ok(manifest)
}

/// Validate a manifest without building
pub fn validate(manifest: &Manifest) -> Result<(), ManifestError> {
    for (name, entry) in sorted_meshes(manifest) {
        if !entry.path.exists() {
            return Err(ManifestError::MissingSource {
                name: name.clone(),
                path: entry.path.clone(),
            });
        }
        for (submesh, sub) in entry.submeshes.iter().enumerate() {
            let source = sub.to_source();
            source
                .setting
                .validate()
                .map_err(|source| ManifestError::Setting {
                    name: name.clone(),
                    submesh,
                    source,
                })?;
            if let Some(mask) = &sub.mask {
                if !mask.exists() {
                    return Err(ManifestError::MissingMask {
                        name: name.clone(),
                        submesh,
                        path: mask.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Build every mesh in the manifest and return the diagnostics of each.
///
/// Per-mesh problems are reported in the returned results; only output
/// directory and write failures abort the build. A mesh with an out-of-range
/// submesh setting is skipped with an error for each bad setting.
pub fn build_all(manifest: &Manifest, output_override: Option<&Path>) -> Result<ImportResults> {
    let output_dir = output_override.unwrap_or(&manifest.output.dir);
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let mut importer = MaskImporter::new();
    for (name, entry) in sorted_meshes(manifest) {
        let output = output_dir.join(format!("{}.{}", name, MASK_MESH_EXT));
        tracing::info!("Masking mesh: {} -> {:?}", name, output);

        let asset = AssetId::new(name.as_str());
        let sources = entry.mask_sources();

        // Out-of-range settings skip the whole mesh
        let invalid: Vec<ImportMessage> = sources
            .iter()
            .enumerate()
            .filter_map(|(submesh, source)| {
                source.setting.validate().err().map(|err| {
                    ImportMessage::error(format!("Submesh {submesh}: {err}; mesh skipped"))
                })
            })
            .collect();
        if !invalid.is_empty() {
            for message in &invalid {
                message.log(&asset);
            }
            importer.results_mut().record(asset, invalid);
            continue;
        }

        let source = load_source(&asset, &entry.path);
        let (settings, warnings) = load_settings(&sources);
        export_mesh(
            &mut importer,
            &asset,
            source.as_ref(),
            &settings,
            warnings,
            entry.options(),
            &output,
        )?;
    }

    Ok(importer.results().clone())
}

fn sorted_meshes(manifest: &Manifest) -> Vec<(&String, &MeshEntry)> {
    let mut meshes: Vec<_> = manifest.meshes.iter().collect();
    meshes.sort_by(|a, b| a.0.cmp(b.0));
    meshes
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
[output]
dir = "out/"

[meshes.rock]
path = "rock.glb"
keep_original_bounds = true

[[meshes.rock.submeshes]]
mask = "rock_mask.png"
color_channel = "red"
threshold = 0.25
invert = true
uv_channel = 1
wrap = "mirror"

[[meshes.rock.submeshes]]

[meshes.fence]
path = "fence.obj"
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest: Manifest = toml::from_str(MANIFEST).unwrap();
        assert_eq!(manifest.output.dir, PathBuf::from("out/"));
        assert_eq!(manifest.meshes.len(), 2);

        let rock = &manifest.meshes["rock"];
        assert!(rock.options().keep_original_bounds);
        assert!(!rock.options().skip_mesh_optimization);
        assert_eq!(rock.submeshes.len(), 2);

        let first = rock.submeshes[0].to_source();
        assert_eq!(first.setting.mask, Some(PathBuf::from("rock_mask.png")));
        assert_eq!(first.setting.color_channel, ColorChannel::Red);
        assert_eq!(first.setting.threshold, 0.25);
        assert!(first.setting.invert);
        assert_eq!(first.setting.uv_channel, 1);
        assert_eq!(first.wrap, WrapMode::Mirror);

        let second = rock.submeshes[1].to_source();
        assert_eq!(second, MaskSource::default());

        assert!(manifest.meshes["fence"].submeshes.is_empty());
    }

    #[test]
    fn test_default_output_dir() {
        let manifest: Manifest = toml::from_str("[meshes.a]\npath = \"a.obj\"\n").unwrap();
        assert_eq!(manifest.output.dir, PathBuf::from("masked/"));
    }

    #[test]
    fn test_unknown_channel_rejected() {
        let text = "[meshes.a]\npath = \"a.obj\"\n[[meshes.a.submeshes]]\ncolor_channel = \"cyan\"\n";
        assert!(toml::from_str::<Manifest>(text).is_err());
    }

    #[test]
    fn test_validate_reports_problems() {
        let dir = tempfile::tempdir().unwrap();
        let mesh_path = dir.path().join("a.obj");
        std::fs::write(&mesh_path, "v 0 0 0\np 1\n").unwrap();

        let mut manifest: Manifest = toml::from_str("").unwrap();
        manifest.meshes.insert(
            "a".to_string(),
            MeshEntry {
                path: mesh_path.clone(),
                keep_original_bounds: false,
                skip_mesh_optimization: false,
                submeshes: vec![SubmeshEntry {
                    mask: None,
                    color_channel: ColorChannel::Alpha,
                    threshold: 1.5,
                    invert: false,
                    uv_channel: 0,
                    wrap: WrapMode::Repeat,
                }],
            },
        );
        assert!(matches!(
            validate(&manifest),
            Err(ManifestError::Setting { submesh: 0, .. })
        ));

        let entry = manifest.meshes.get_mut("a").unwrap();
        entry.submeshes[0].threshold = 0.5;
        entry.submeshes[0].mask = Some(dir.path().join("missing.png"));
        assert!(matches!(
            validate(&manifest),
            Err(ManifestError::MissingMask { .. })
        ));

        manifest.meshes.get_mut("a").unwrap().submeshes.clear();
        assert!(validate(&manifest).is_ok());

        manifest.meshes.get_mut("a").unwrap().path = dir.path().join("gone.obj");
        let err = validate(&manifest).unwrap_err();
        assert!(err.to_string().contains("source not found"));
    }

    #[test]
    fn test_build_skips_mesh_with_invalid_setting() {
        let dir = tempfile::tempdir().unwrap();
        let mesh_path = dir.path().join("tri.obj");
        std::fs::write(&mesh_path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let text = format!(
            "[meshes.tri]\npath = {:?}\n\n[[meshes.tri.submeshes]]\nthreshold = 1.5\n\n[[meshes.tri.submeshes]]\nuv_channel = 12\n",
            mesh_path.to_str().unwrap()
        );
        let manifest: Manifest = toml::from_str(&text).unwrap();
        let out_dir = dir.path().join("out");

        let results = build_all(&manifest, Some(&out_dir)).unwrap();

        let asset = AssetId::new("tri");
        assert_eq!(results.failed_assets().collect::<Vec<_>>(), vec![&asset]);
        let messages = results.latest(&asset).unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].text.starts_with("Submesh 0: threshold 1.5"));
        assert!(messages[1].text.starts_with("Submesh 1: UV channel 12"));
        assert!(!out_dir.join("tri.maskmesh").exists());
    }
}
