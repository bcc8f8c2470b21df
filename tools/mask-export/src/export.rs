//! Load, mask and write one mesh

use anyhow::{Context, Result};
use mask_common::{
    AssetId, ImportMessage, ImportOptions, MaskImage, MaskImporter, MaskSetting, Mesh, WrapMode,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::formats::write_mask_mesh;
use crate::mesh::load_mesh;
use crate::texture::load_mask;

/// Mask configuration as authored, before the mask image is loaded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaskSource {
    pub setting: MaskSetting<PathBuf>,
    pub wrap: WrapMode,
}

/// Load the mask image of one source.
///
/// A mask that fails to load becomes "no mask", and the load error is
/// returned alongside so the caller can report it.
pub fn load_setting(source: &MaskSource) -> (MaskSetting<MaskImage>, Option<anyhow::Error>) {
    let mut error = None;
    let setting = source
        .setting
        .clone()
        .map_mask(|path| match load_mask(&path, source.wrap) {
            Ok(mask) => Some(mask),
            Err(err) => {
                error = Some(err);
                None
            }
        });
    (setting, error)
}

/// Load the mask image of every source.
///
/// A mask that fails to load becomes "no mask" for its submesh, with a
/// warning describing why.
pub fn load_settings(sources: &[MaskSource]) -> (Vec<MaskSetting<MaskImage>>, Vec<ImportMessage>) {
    let mut warnings = Vec::new();
    let settings = sources
        .iter()
        .enumerate()
        .map(|(submesh, source)| {
            let (setting, error) = load_setting(source);
            if let Some(err) = error {
                warnings.push(ImportMessage::warning(format!(
                    "Submesh {submesh}: {err:#}; treating it as no mask"
                )));
            }
            setting
        })
        .collect();
    (settings, warnings)
}

/// Load the source mesh of `asset`, logging why when it cannot be read.
pub fn load_source(asset: &AssetId, input: &Path) -> Option<Mesh> {
    match load_mesh(input) {
        Ok(mesh) => Some(mesh),
        Err(err) => {
            tracing::error!("{}: {:#}", asset, err);
            None
        }
    }
}

/// Run the mask pass on `source` and write the result to `output`.
///
/// A missing source is reported through the importer and nothing is
/// written. Returns whether an output file was written.
pub fn export_mesh(
    importer: &mut MaskImporter,
    asset: &AssetId,
    source: Option<&Mesh>,
    settings: &[MaskSetting<MaskImage>],
    mut warnings: Vec<ImportMessage>,
    options: ImportOptions,
    output: &Path,
) -> Result<bool> {
    for warning in &warnings {
        warning.log(asset);
    }

    let result = importer.import(asset, source, settings, options);

    // Keep mask load warnings with the import diagnostics
    if !warnings.is_empty() {
        warnings.extend(result.messages);
        importer.results_mut().record(asset.clone(), warnings);
    }

    let Some(mesh) = result.mesh else {
        return Ok(false);
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }
    let file = File::create(output)
        .with_context(|| format!("Failed to create output file: {:?}", output))?;
    let mut w = BufWriter::new(file);
    write_mask_mesh(&mut w, &mesh).with_context(|| format!("Failed to write {:?}", output))?;

    tracing::info!(
        "Wrote {:?}: {} vertices, {} submeshes",
        output,
        mesh.positions.len(),
        mesh.submeshes.len()
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mask_common::MessageLevel;

    #[test]
    fn test_missing_mask_becomes_warning() {
        let sources = vec![
            MaskSource::default(),
            MaskSource {
                setting: MaskSetting::with_mask(PathBuf::from("missing_mask.png")),
                wrap: WrapMode::Clamp,
            },
        ];
        let (settings, warnings) = load_settings(&sources);
        assert_eq!(settings.len(), 2);
        assert!(settings.iter().all(|s| s.mask.is_none()));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, MessageLevel::Warning);
        assert!(warnings[0].text.starts_with("Submesh 1:"));
    }

    #[test]
    fn test_load_setting_returns_mask_error() {
        let source = MaskSource {
            setting: MaskSetting {
                threshold: 0.25,
                invert: true,
                ..MaskSetting::with_mask(PathBuf::from("missing_mask.png"))
            },
            wrap: WrapMode::Repeat,
        };
        let (setting, error) = load_setting(&source);
        assert!(setting.mask.is_none());
        assert_eq!(setting.threshold, 0.25);
        assert!(setting.invert);
        assert!(format!("{:#}", error.unwrap()).contains("missing_mask.png"));

        let (setting, error) = load_setting(&MaskSource::default());
        assert!(setting.mask.is_none());
        assert!(error.is_none());
    }

    #[test]
    fn test_missing_source_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.maskmesh");
        let asset = AssetId::new("ghost");
        let mut importer = MaskImporter::new();

        let written = export_mesh(
            &mut importer,
            &asset,
            load_source(&asset, &dir.path().join("ghost.obj")).as_ref(),
            &[],
            Vec::new(),
            ImportOptions::default(),
            &output,
        )
        .unwrap();

        assert!(!written);
        assert!(!output.exists());
        let latest = importer.results().latest(&asset).unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].level, MessageLevel::Warning);
    }

    #[test]
    fn test_exports_obj_without_masks() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tri.obj");
        std::fs::write(&input, "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1/1 2/1 3/1\n").unwrap();
        let output = dir.path().join("nested/tri.maskmesh");

        let asset = AssetId::new("tri");
        let mut importer = MaskImporter::new();
        let written = export_mesh(
            &mut importer,
            &asset,
            load_source(&asset, &input).as_ref(),
            &[],
            Vec::new(),
            ImportOptions::default(),
            &output,
        )
        .unwrap();

        assert!(written);
        let bytes = std::fs::read(&output).unwrap();
        let mesh = crate::formats::read_mask_mesh(&bytes, "tri").unwrap();
        assert_eq!(mesh.submeshes[0].indices, vec![0, 1, 2]);
    }
}
