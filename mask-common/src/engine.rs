//! Face filtering by mask texture.
//!
//! A submesh index list is walked in face groups of
//! [`Topology::group_size`] indices. For every group the UV centroid is
//! sampled from the mask and the group is kept or dropped as a whole, so the
//! result is always an in-order subsequence of whole groups.

use glam::Vec2;

use crate::error::{MaskError, MaskResult};
use crate::sampler::TextureSampler;
use crate::setting::MaskSetting;
use crate::topology::Topology;

/// Filtered index list for one submesh plus its diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub indices: Vec<u32>,
    /// Extra context, such as a missing mask or untouched topology.
    pub note: Option<String>,
    /// "unchanged: N T." or "reduced from X to Y T."
    pub summary: String,
}

impl FilterOutcome {
    /// Note and summary in reporting order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.note.as_deref().into_iter().chain([self.summary.as_str()])
    }
}

/// Filter the faces of one submesh against its mask setting.
///
/// `uvs` is the mesh-wide UV array for `setting.uv_channel` (absolute vertex
/// indexing, i.e. `base_vertex + index`), or `None` if the channel is missing.
/// UVs are only read when a mask is configured.
///
/// Fails with an indexing error when a mask is configured and a UV lookup or
/// sample cannot be resolved; the caller decides how to recover.
pub fn filter_faces<S: TextureSampler>(
    topology: Topology,
    indices: &[u32],
    base_vertex: u32,
    uvs: Option<&[Vec2]>,
    setting: &MaskSetting<S>,
) -> MaskResult<FilterOutcome> {
    let group_size = topology.group_size();
    if group_size == 0 {
        return Ok(FilterOutcome {
            indices: indices.to_vec(),
            note: Some(format!("topology {topology} left untouched")),
            summary: unchanged(indices.len(), topology),
        });
    }

    let Some(mask) = setting.mask.as_ref() else {
        // Nothing is masked; inverting "nothing masked" keeps every face as well
        let note = if setting.invert {
            "no mask selected (inverted, keeping all faces)"
        } else {
            "no mask selected"
        };
        return Ok(FilterOutcome {
            indices: indices.to_vec(),
            note: Some(note.to_string()),
            summary: unchanged(indices.len(), topology),
        });
    };

    let uvs = uvs.ok_or(MaskError::MissingUvChannel {
        channel: setting.uv_channel,
    })?;

    let mut filtered = Vec::with_capacity(indices.len());
    for group in indices.chunks_exact(group_size) {
        let centroid = centroid_uv(group, base_vertex, uvs, setting.uv_channel)?;
        let color = mask
            .sample_bilinear(centroid)
            .ok_or(MaskError::SampleFailed {
                u: centroid.x,
                v: centroid.y,
            })?;
        if setting.keeps(setting.color_channel.extract(color)) {
            filtered.extend_from_slice(group);
        }
    }

    let before = indices.len() / group_size;
    let after = filtered.len() / group_size;
    let summary = if before == after {
        unchanged(indices.len(), topology)
    } else {
        format!("reduced from {before} to {after} {topology}.")
    };

    tracing::trace!("{} groups of {}: {}", before, topology, summary);

    Ok(FilterOutcome {
        indices: filtered,
        note: None,
        summary,
    })
}

/// Mean UV of one face group.
fn centroid_uv(group: &[u32], base_vertex: u32, uvs: &[Vec2], channel: u8) -> MaskResult<Vec2> {
    let mut sum = Vec2::ZERO;
    for &index in group {
        let vertex = base_vertex as usize + index as usize;
        let uv = uvs.get(vertex).ok_or(MaskError::UvIndexOutOfRange {
            index: vertex,
            channel,
            len: uvs.len(),
        })?;
        sum += *uv;
    }
    Ok(sum / group.len() as f32)
}

fn unchanged(index_count: usize, topology: Topology) -> String {
    format!(
        "unchanged: {} {topology}.",
        topology.group_count(index_count)
    )
}
