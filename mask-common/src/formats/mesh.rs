//! MaskMesh binary format (.maskmesh)
//!
//! A mesh with shared vertex attributes and per-submesh index lists.
//!
//! # Layout
//! ```text
//! 0x00: vertex_count u32
//! 0x04: submesh_count u32
//! 0x08: uv_channels u8 (bit n set when UV channel n is present)
//! 0x09: attributes u8 (ATTRIBUTE_NORMALS | ATTRIBUTE_COLORS)
//! 0x0A: padding (2 bytes)
//! 0x0C: submesh headers (submesh_count * 36 bytes)
//! var:  positions (vertex_count * 3 f32)
//! var:  normals (vertex_count * 3 f32), if ATTRIBUTE_NORMALS
//! var:  colors (vertex_count * 4 f32), if ATTRIBUTE_COLORS
//! var:  uvs (vertex_count * 2 f32) per present channel, ascending
//! var:  indices (index_count u32) per submesh, in submesh order
//! ```

use glam::Vec3;

use crate::mesh::Aabb;
use crate::topology::Topology;

/// Per-vertex normals are present.
pub const ATTRIBUTE_NORMALS: u8 = 0x01;
/// Per-vertex RGBA colors are present.
pub const ATTRIBUTE_COLORS: u8 = 0x02;

/// MaskMesh file header (12 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct MaskMeshHeader {
    pub vertex_count: u32,
    pub submesh_count: u32,
    pub uv_channels: u8,
    pub attributes: u8,
    pub _padding: [u8; 2],
}

impl MaskMeshHeader {
    pub const SIZE: usize = 12;

    pub fn new(vertex_count: u32, submesh_count: u32, uv_channels: u8, attributes: u8) -> Self {
        Self {
            vertex_count,
            submesh_count,
            uv_channels,
            attributes,
            _padding: [0; 2],
        }
    }

    pub fn has_normals(&self) -> bool {
        self.attributes & ATTRIBUTE_NORMALS != 0
    }

    pub fn has_colors(&self) -> bool {
        self.attributes & ATTRIBUTE_COLORS != 0
    }

    /// Size of the vertex attribute block in bytes.
    pub fn vertex_data_size(&self) -> usize {
        let mut floats_per_vertex = 3;
        if self.has_normals() {
            floats_per_vertex += 3;
        }
        if self.has_colors() {
            floats_per_vertex += 4;
        }
        floats_per_vertex += 2 * self.uv_channels.count_ones() as usize;
        self.vertex_count as usize * floats_per_vertex * 4
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.vertex_count.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.submesh_count.to_le_bytes());
        bytes[8] = self.uv_channels;
        bytes[9] = self.attributes;
        // padding bytes stay 0
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            vertex_count: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            submesh_count: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            uv_channels: bytes[8],
            attributes: bytes[9],
            _padding: [0; 2],
        })
    }
}

/// Per-submesh header (36 bytes)
///
/// ```text
/// 0x00: topology u8
/// 0x01: padding (3 bytes)
/// 0x04: base_vertex u32
/// 0x08: index_count u32
/// 0x0C: bounds min (3 f32)
/// 0x18: bounds max (3 f32)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubMeshHeader {
    pub topology: Topology,
    pub base_vertex: u32,
    pub index_count: u32,
    pub bounds: Aabb,
}

impl SubMeshHeader {
    pub const SIZE: usize = 36;

    pub fn new(topology: Topology, base_vertex: u32, index_count: u32, bounds: Aabb) -> Self {
        Self {
            topology,
            base_vertex,
            index_count,
            bounds,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0] = self.topology.to_u8();
        bytes[4..8].copy_from_slice(&self.base_vertex.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.index_count.to_le_bytes());
        let corners = self.bounds.min.to_array().into_iter().chain(self.bounds.max.to_array());
        for (i, value) in corners.enumerate() {
            let offset = 12 + i * 4;
            bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let u32_at = |offset: usize| {
            u32::from_le_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ])
        };
        let f32_at = |offset: usize| f32::from_bits(u32_at(offset));
        Some(Self {
            topology: Topology::from_u8(bytes[0]),
            base_vertex: u32_at(4),
            index_count: u32_at(8),
            bounds: Aabb {
                min: Vec3::new(f32_at(12), f32_at(16), f32_at(20)),
                max: Vec3::new(f32_at(24), f32_at(28), f32_at(32)),
            },
        })
    }
}
