//! Reading and writing `.maskmesh` files
//!
//! Header definitions live in mask-common; this module moves whole meshes
//! in and out of the format.

pub use mask_common::formats::*;

use anyhow::{bail, Context, Result};
use glam::{Vec2, Vec3, Vec4};
use mask_common::{Mesh, SubMesh, Topology, MAX_UV_CHANNELS};
use std::io::Write;

/// Write a complete MaskMesh file
pub fn write_mask_mesh<W: Write>(w: &mut W, mesh: &Mesh) -> Result<()> {
    mesh.validate()?;

    let vertex_count = u32::try_from(mesh.positions.len()).context("Too many vertices")?;
    let submesh_count = u32::try_from(mesh.submeshes.len()).context("Too many submeshes")?;
    let mut attributes = 0;
    if mesh.normals.is_some() {
        attributes |= ATTRIBUTE_NORMALS;
    }
    if mesh.colors.is_some() {
        attributes |= ATTRIBUTE_COLORS;
    }

    let header = MaskMeshHeader::new(
        vertex_count,
        submesh_count,
        mesh.uv_channel_mask(),
        attributes,
    );
    w.write_all(&header.to_bytes())?;

    for sub in &mesh.submeshes {
        let index_count = u32::try_from(sub.indices.len()).context("Too many indices")?;
        let sub_header = SubMeshHeader::new(sub.topology, sub.base_vertex, index_count, sub.bounds);
        w.write_all(&sub_header.to_bytes())?;
    }

    for p in &mesh.positions {
        write_floats(w, &p.to_array())?;
    }
    if let Some(normals) = &mesh.normals {
        for n in normals.iter().take(mesh.positions.len()) {
            write_floats(w, &n.to_array())?;
        }
    }
    if let Some(colors) = &mesh.colors {
        for c in colors.iter().take(mesh.positions.len()) {
            write_floats(w, &c.to_array())?;
        }
    }
    for (channel, uvs) in mesh.uv_channels.iter().enumerate() {
        let Some(uvs) = uvs else { continue };
        if uvs.len() < mesh.positions.len() {
            bail!(
                "UV channel {} has {} entries for {} vertices",
                channel,
                uvs.len(),
                mesh.positions.len()
            );
        }
        for uv in uvs.iter().take(mesh.positions.len()) {
            write_floats(w, &uv.to_array())?;
        }
    }

    for sub in &mesh.submeshes {
        for i in &sub.indices {
            w.write_all(&i.to_le_bytes())?;
        }
    }

    Ok(())
}

/// Parse a complete MaskMesh file
pub fn read_mask_mesh(bytes: &[u8], name: impl Into<String>) -> Result<Mesh> {
    let header = MaskMeshHeader::deserialize(bytes).context("Truncated MaskMesh header")?;
    let submesh_count = header.submesh_count as usize;
    let vertex_count = header.vertex_count as usize;

    let mut cursor = Cursor::new(bytes, MaskMeshHeader::SIZE);
    let sub_headers = SubMeshHeader::deserialize_many(cursor.rest(), submesh_count)
        .context("Truncated submesh headers")?;
    cursor.skip(SubMeshHeader::SIZE * submesh_count)?;

    let positions = cursor.read_vec(vertex_count, |f| Vec3::new(f[0], f[1], f[2]), 3)?;
    let normals = if header.has_normals() {
        Some(cursor.read_vec(vertex_count, |f| Vec3::new(f[0], f[1], f[2]), 3)?)
    } else {
        None
    };
    let colors = if header.has_colors() {
        Some(cursor.read_vec(vertex_count, |f| Vec4::new(f[0], f[1], f[2], f[3]), 4)?)
    } else {
        None
    };

    let mut mesh = Mesh::new(name, positions);
    mesh.normals = normals;
    mesh.colors = colors;
    for channel in 0..MAX_UV_CHANNELS {
        if header.uv_channels & (1u8 << channel) != 0 {
            let uvs = cursor.read_vec(vertex_count, |f| Vec2::new(f[0], f[1]), 2)?;
            mesh = mesh.with_uvs(channel, uvs);
        }
    }

    for sub_header in sub_headers {
        let indices = cursor.read_u32s(sub_header.index_count as usize)?;
        mesh.submeshes.push(SubMesh {
            topology: sub_header.topology,
            indices,
            base_vertex: sub_header.base_vertex,
            bounds: sub_header.bounds,
        });
    }

    if cursor.remaining() > 0 {
        tracing::warn!("{} trailing bytes after MaskMesh data", cursor.remaining());
    }

    mesh.validate()?;
    Ok(mesh)
}

/// Count faces per submesh for display.
pub fn face_count(topology: Topology, index_count: usize) -> usize {
    topology.group_count(index_count)
}

fn write_floats<W: Write>(w: &mut W, values: &[f32]) -> Result<()> {
    for v in values {
        w.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

/// Little-endian reader over the body of a MaskMesh file.
struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8], offset: usize) -> Self {
        Self { bytes, offset }
    }

    fn rest(&self) -> &'a [u8] {
        self.bytes.get(self.offset..).unwrap_or_default()
    }

    fn remaining(&self) -> usize {
        self.rest().len()
    }

    fn skip(&mut self, len: usize) -> Result<()> {
        if self.remaining() < len {
            bail!(
                "Truncated MaskMesh: need {} more bytes at offset {}, have {}",
                len,
                self.offset,
                self.remaining()
            );
        }
        self.offset += len;
        Ok(())
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let start = self.offset;
        self.skip(len)?;
        Ok(&self.bytes[start..start + len])
    }

    fn read_u32s(&mut self, count: usize) -> Result<Vec<u32>> {
        let data = self.take(count * 4)?;
        Ok(data
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    fn read_vec<T>(&mut self, count: usize, build: impl Fn(&[f32]) -> T, width: usize) -> Result<Vec<T>> {
        let data = self.take(count * width * 4)?;
        let floats: Vec<f32> = data
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(floats.chunks_exact(width).map(build).collect())
    }
}
