//! In-memory mesh with per-submesh index lists.
//!
//! Vertex attributes are shared by every submesh; a submesh's indices are
//! relative to its `base_vertex`, so the absolute vertex of index `i` is
//! `base_vertex + i`.

use glam::{Vec2, Vec3, Vec4};

use crate::MAX_UV_CHANNELS;
use crate::error::FormatError;
use crate::topology::Topology;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box around `points`, or an empty box at the origin when there are none.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points
            .into_iter()
            .fold(None, |bounds: Option<Aabb>, point| {
                Some(match bounds {
                    Some(b) => Aabb {
                        min: b.min.min(point),
                        max: b.max.max(point),
                    },
                    None => Aabb {
                        min: point,
                        max: point,
                    },
                })
            })
            .unwrap_or_default()
    }

    pub fn union(self, other: Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// One independently indexed region of a [`Mesh`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubMesh {
    pub topology: Topology,
    pub indices: Vec<u32>,
    pub base_vertex: u32,
    pub bounds: Aabb,
}

impl SubMesh {
    pub fn new(topology: Topology, indices: Vec<u32>, base_vertex: u32) -> Self {
        Self {
            topology,
            indices,
            base_vertex,
            bounds: Aabb::default(),
        }
    }

    /// Absolute vertex indices referenced by this submesh.
    pub fn absolute_indices(&self) -> impl Iterator<Item = u64> + '_ {
        let base = u64::from(self.base_vertex);
        self.indices.iter().map(move |&i| base + u64::from(i))
    }
}

/// Mesh data as seen by the mask pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub colors: Option<Vec<Vec4>>,
    /// UV channels 0-7; `None` for channels the source does not provide.
    pub uv_channels: [Option<Vec<Vec2>>; MAX_UV_CHANNELS],
    pub submeshes: Vec<SubMesh>,
    /// Whether vertex and index data may be read on the CPU.
    pub readable: bool,
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            name: String::new(),
            positions: Vec::new(),
            normals: None,
            colors: None,
            uv_channels: Default::default(),
            submeshes: Vec::new(),
            readable: true,
        }
    }
}

impl Mesh {
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            positions,
            ..Default::default()
        }
    }

    /// Set UV channel `channel`. Channels past 7 are ignored.
    pub fn with_uvs(mut self, channel: usize, uvs: Vec<Vec2>) -> Self {
        if let Some(slot) = self.uv_channels.get_mut(channel) {
            *slot = Some(uvs);
        }
        self
    }

    /// Append a submesh and compute its bounds.
    pub fn with_submesh(mut self, submesh: SubMesh) -> Self {
        self.submeshes.push(submesh);
        let last = self.submeshes.len() - 1;
        self.recompute_bounds(last);
        self
    }

    /// Bitmask of present UV channels (bit `n` set for channel `n`).
    pub fn uv_channel_mask(&self) -> u8 {
        self.uv_channels
            .iter()
            .enumerate()
            .filter(|(_, uvs)| uvs.is_some())
            .fold(0, |mask, (channel, _)| mask | (1u8 << channel))
    }

    /// Union of all submesh bounds.
    pub fn bounds(&self) -> Aabb {
        self.submeshes
            .iter()
            .map(|s| s.bounds)
            .reduce(Aabb::union)
            .unwrap_or_default()
    }

    /// Recompute the bounds of `submesh` from the vertices it references.
    pub fn recompute_bounds(&mut self, submesh: usize) {
        let Some(sub) = self.submeshes.get(submesh) else {
            return;
        };
        let positions = &self.positions;
        let bounds = Aabb::from_points(
            sub.absolute_indices()
                .filter_map(|v| usize::try_from(v).ok())
                .filter_map(|v| positions.get(v).copied()),
        );
        self.submeshes[submesh].bounds = bounds;
    }

    /// Check that every submesh only references existing vertices and that
    /// present attribute arrays match the vertex count.
    pub fn validate(&self) -> Result<(), FormatError> {
        let vertex_count = self.positions.len();
        for (submesh, sub) in self.submeshes.iter().enumerate() {
            if let Some(vertex) = sub.absolute_indices().find(|&v| v >= vertex_count as u64) {
                return Err(FormatError::VertexOutOfRange {
                    submesh,
                    vertex,
                    vertex_count: vertex_count as u32,
                });
            }
        }
        let attribute_lens = self
            .normals
            .iter()
            .map(Vec::len)
            .chain(self.colors.iter().map(Vec::len));
        for len in attribute_lens {
            if len < vertex_count {
                return Err(FormatError::Truncated {
                    len,
                    expected: vertex_count,
                });
            }
        }
        Ok(())
    }
}

/// Mesh access needed by the import pass.
///
/// Implemented by [`Mesh`]; other mesh stores can implement it to run the
/// same pass without converting.
pub trait MeshAccessor {
    fn is_readable(&self) -> bool;

    fn vertex_count(&self) -> usize;

    fn submesh_count(&self) -> usize;

    fn topology(&self, submesh: usize) -> Topology;

    fn indices(&self, submesh: usize) -> &[u32];

    fn base_vertex(&self, submesh: usize) -> u32;

    /// UV array for `channel`, or `None` when the channel does not exist.
    fn uvs(&self, channel: u8) -> Option<&[Vec2]>;

    /// Replace a submesh index list, keeping its topology and base vertex.
    fn set_indices(&mut self, submesh: usize, indices: Vec<u32>, recompute_bounds: bool);

    /// Drop vertices no submesh references. Returns how many were removed.
    fn optimize(&mut self) -> usize;
}

impl MeshAccessor for Mesh {
    fn is_readable(&self) -> bool {
        self.readable
    }

    fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }

    fn topology(&self, submesh: usize) -> Topology {
        self.submeshes
            .get(submesh)
            .map_or(Topology::Unsupported, |s| s.topology)
    }

    fn indices(&self, submesh: usize) -> &[u32] {
        self.submeshes
            .get(submesh)
            .map(|s| s.indices.as_slice())
            .unwrap_or_default()
    }

    fn base_vertex(&self, submesh: usize) -> u32 {
        self.submeshes.get(submesh).map_or(0, |s| s.base_vertex)
    }

    fn uvs(&self, channel: u8) -> Option<&[Vec2]> {
        self.uv_channels
            .get(usize::from(channel))
            .and_then(|uvs| uvs.as_deref())
    }

    fn set_indices(&mut self, submesh: usize, indices: Vec<u32>, recompute_bounds: bool) {
        let Some(sub) = self.submeshes.get_mut(submesh) else {
            tracing::warn!("Ignoring index list for missing submesh {}", submesh);
            return;
        };
        sub.indices = indices;
        if recompute_bounds {
            self.recompute_bounds(submesh);
        }
    }

    fn optimize(&mut self) -> usize {
        crate::compact::compact_vertices(self)
    }
}
