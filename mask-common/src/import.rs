//! Mask import pass over a whole mesh.
//!
//! [`MaskImporter`] duplicates the source mesh, filters each submesh with
//! [`filter_faces`], optionally compacts the result and records the
//! diagnostics of the most recent import per asset.

use std::fmt;

use hashbrown::HashMap;

use crate::engine::filter_faces;
use crate::mesh::MeshAccessor;
use crate::sampler::TextureSampler;
use crate::setting::MaskSetting;

/// Stable identity of an imported asset (manifest key, path, GUID...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

/// One human-readable import diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportMessage {
    pub level: MessageLevel,
    pub text: String,
}

impl ImportMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            text: text.into(),
        }
    }

    /// Forward this message to `tracing` at its level.
    pub fn log(&self, asset: &AssetId) {
        match self.level {
            MessageLevel::Info => tracing::info!("{}: {}", asset, self.text),
            MessageLevel::Warning => tracing::warn!("{}: {}", asset, self.text),
            MessageLevel::Error => tracing::error!("{}: {}", asset, self.text),
        }
    }
}

impl fmt::Display for ImportMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            MessageLevel::Info => write!(f, "{}", self.text),
            MessageLevel::Warning => write!(f, "warning: {}", self.text),
            MessageLevel::Error => write!(f, "error: {}", self.text),
        }
    }
}

/// Diagnostics of the latest import per asset. Each import overwrites the
/// previous entry for its asset.
#[derive(Debug, Clone, Default)]
pub struct ImportResults {
    latest: HashMap<AssetId, Vec<ImportMessage>>,
}

impl ImportResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, asset: AssetId, messages: Vec<ImportMessage>) {
        self.latest.insert(asset, messages);
    }

    pub fn latest(&self, asset: &AssetId) -> Option<&[ImportMessage]> {
        self.latest.get(asset).map(Vec::as_slice)
    }

    pub fn remove(&mut self, asset: &AssetId) -> Option<Vec<ImportMessage>> {
        self.latest.remove(asset)
    }

    pub fn clear(&mut self) {
        self.latest.clear();
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }

    /// Assets with at least one error-level message.
    pub fn failed_assets(&self) -> impl Iterator<Item = &AssetId> {
        self.latest
            .iter()
            .filter(|(_, messages)| messages.iter().any(|m| m.level == MessageLevel::Error))
            .map(|(asset, _)| asset)
    }
}

/// Global flags of one import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportOptions {
    /// Keep submesh bounds as they were in the source.
    pub keep_original_bounds: bool,
    /// Leave unreferenced vertices in the output.
    pub skip_mesh_optimization: bool,
}

/// Result of one import pass.
#[derive(Debug, Clone)]
pub struct ImportOutput<M> {
    /// `None` when the source was missing or unreadable.
    pub mesh: Option<M>,
    pub messages: Vec<ImportMessage>,
}

impl<M> ImportOutput<M> {
    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.level == MessageLevel::Error)
    }
}

/// Runs mask imports and keeps the latest diagnostics per asset.
#[derive(Debug, Default)]
pub struct MaskImporter {
    results: ImportResults,
}

impl MaskImporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> &ImportResults {
        &self.results
    }

    pub fn results_mut(&mut self) -> &mut ImportResults {
        &mut self.results
    }

    /// Import `source` with one setting per submesh.
    ///
    /// Submeshes without a setting use the defaults. A mask that is not
    /// readable is treated as no mask. A submesh that fails to filter keeps
    /// its original indices and gets an error message; other submeshes
    /// continue.
    pub fn import<M, S>(
        &mut self,
        asset: &AssetId,
        source: Option<&M>,
        settings: &[MaskSetting<S>],
        options: ImportOptions,
    ) -> ImportOutput<M>
    where
        M: MeshAccessor + Clone,
        S: TextureSampler,
    {
        let output = run_import(source, settings, options);
        for message in &output.messages {
            message.log(asset);
        }
        self.results.record(asset.clone(), output.messages.clone());
        output
    }
}

fn run_import<M, S>(
    source: Option<&M>,
    settings: &[MaskSetting<S>],
    options: ImportOptions,
) -> ImportOutput<M>
where
    M: MeshAccessor + Clone,
    S: TextureSampler,
{
    let Some(source) = source.filter(|mesh| mesh.is_readable()) else {
        return ImportOutput {
            mesh: None,
            messages: vec![ImportMessage::warning(
                "source mesh is missing or not readable; nothing was imported",
            )],
        };
    };

    let mut mesh = source.clone();
    let mut messages = Vec::new();

    if settings.len() > mesh.submesh_count() {
        messages.push(ImportMessage::warning(format!(
            "{} mask settings for {} submeshes; extra settings ignored",
            settings.len(),
            mesh.submesh_count()
        )));
    }

    for submesh in 0..mesh.submesh_count() {
        let mut setting = settings
            .get(submesh)
            .map(MaskSetting::as_ref)
            .unwrap_or_default();

        if setting.mask.is_some_and(|mask| !mask.is_readable()) {
            messages.push(ImportMessage::warning(format!(
                "Submesh {submesh}: mask is not readable, treating it as no mask"
            )));
            setting.mask = None;
        }

        let topology = mesh.topology(submesh);
        let outcome = filter_faces(
            topology,
            mesh.indices(submesh),
            mesh.base_vertex(submesh),
            mesh.uvs(setting.uv_channel),
            &setting,
        );

        match outcome {
            Ok(outcome) => {
                messages.extend(
                    outcome
                        .lines()
                        .map(|line| ImportMessage::info(format!("Submesh {submesh}: {line}"))),
                );
                mesh.set_indices(submesh, outcome.indices, !options.keep_original_bounds);
            }
            Err(err) => {
                messages.push(ImportMessage::error(format!(
                    "Submesh {submesh}: {err}. Check that UV channel {} exists and covers every vertex.",
                    setting.uv_channel
                )));
            }
        }
    }

    if !options.skip_mesh_optimization {
        let removed = mesh.optimize();
        if removed > 0 {
            messages.push(ImportMessage::info(format!(
                "removed {removed} unused vertices"
            )));
        }
    }

    ImportOutput {
        mesh: Some(mesh),
        messages,
    }
}
