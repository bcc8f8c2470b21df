//! glTF/GLB mesh loading

use anyhow::{bail, Context, Result};
use glam::{Vec2, Vec3, Vec4};
use gltf::mesh::Mode;
use mask_common::{Mesh, SubMesh, Topology, MAX_UV_CHANNELS};
use std::path::Path;

/// Load the first mesh of a glTF/GLB file.
///
/// Every primitive becomes one submesh. Vertex buffers are concatenated, so a
/// primitive's `base_vertex` is the number of vertices loaded before it.
pub fn load_gltf(input: &Path) -> Result<Mesh> {
    let (document, buffers, _images) =
        gltf::import(input).with_context(|| format!("Failed to load glTF: {:?}", input))?;

    let gltf_mesh = document
        .meshes()
        .next()
        .context("No meshes found in glTF")?;

    let name = gltf_mesh
        .name()
        .map(str::to_string)
        .or_else(|| {
            input
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_default();

    let mut positions: Vec<Vec3> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut colors: Vec<Vec4> = Vec::new();
    let mut uv_channels: [Vec<Vec2>; MAX_UV_CHANNELS] = Default::default();
    let mut has_normals = false;
    let mut has_colors = false;
    let mut has_uvs = [false; MAX_UV_CHANNELS];
    let mut submeshes = Vec::new();

    for primitive in gltf_mesh.primitives() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        // Positions (required)
        let primitive_positions: Vec<Vec3> = reader
            .read_positions()
            .context("No positions in primitive")?
            .map(Vec3::from)
            .collect();
        let vertex_count = primitive_positions.len();
        let base_vertex = u32::try_from(positions.len())
            .context("Mesh has more vertices than u32 indices can address")?;

        // Attributes missing from this primitive are filled with defaults so
        // every array stays aligned with positions
        let primitive_index = primitive.index();
        let read = reader.read_normals().map(|iter| iter.map(Vec3::from).collect());
        has_normals |= read.is_some();
        append_attribute(&mut normals, read, Vec3::Y, vertex_count, "NORMAL", primitive_index)?;

        let read = reader
            .read_colors(0)
            .map(|iter| iter.into_rgba_f32().map(Vec4::from).collect());
        has_colors |= read.is_some();
        append_attribute(&mut colors, read, Vec4::ONE, vertex_count, "COLOR_0", primitive_index)?;

        for (channel, uvs) in uv_channels.iter_mut().enumerate() {
            let read = reader
                .read_tex_coords(channel as u32)
                .map(|iter| iter.into_f32().map(Vec2::from).collect());
            has_uvs[channel] |= read.is_some();
            let name = format!("TEXCOORD_{}", channel);
            append_attribute(uvs, read, Vec2::ZERO, vertex_count, &name, primitive_index)?;
        }

        // Indices (optional) - non-indexed primitives draw vertices in order
        let indices: Vec<u32> = match reader.read_indices() {
            Some(iter) => iter.into_u32().collect(),
            None => (0..vertex_count as u32).collect(),
        };
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            bail!(
                "Primitive {} index {} exceeds its {} vertices",
                primitive.index(),
                index,
                vertex_count
            );
        }

        let topology = topology_from_mode(primitive.mode());
        if !topology.is_supported() {
            tracing::warn!(
                "Primitive {} uses {:?}, which will be exported without masking",
                primitive.index(),
                primitive.mode()
            );
        }

        positions.extend(primitive_positions);
        submeshes.push(SubMesh::new(topology, indices, base_vertex));
    }

    let mut mesh = Mesh::new(name, positions);
    mesh.normals = has_normals.then_some(normals);
    mesh.colors = has_colors.then_some(colors);
    for (channel, uvs) in uv_channels.into_iter().enumerate() {
        if has_uvs[channel] {
            mesh = mesh.with_uvs(channel, uvs);
        }
    }
    for submesh in submeshes {
        mesh = mesh.with_submesh(submesh);
    }

    tracing::info!(
        "Loaded glTF mesh '{}': {} vertices, {} submeshes",
        mesh.name,
        mesh.positions.len(),
        mesh.submeshes.len()
    );

    Ok(mesh)
}

/// Append one primitive's attribute values, or `fill` when it has none.
///
/// Fails when the attribute count differs from the primitive's vertex count,
/// which would misalign every later primitive.
fn append_attribute<T: Copy>(
    dst: &mut Vec<T>,
    values: Option<Vec<T>>,
    fill: T,
    vertex_count: usize,
    name: &str,
    primitive: usize,
) -> Result<()> {
    match values {
        Some(values) if values.len() != vertex_count => bail!(
            "Primitive {} {} has {} entries for {} vertices",
            primitive,
            name,
            values.len(),
            vertex_count
        ),
        Some(values) => dst.extend(values),
        None => dst.extend(std::iter::repeat(fill).take(vertex_count)),
    }
    Ok(())
}

/// Map a glTF primitive mode to a mask topology.
pub(crate) fn topology_from_mode(mode: Mode) -> Topology {
    match mode {
        Mode::Points => Topology::Points,
        Mode::Lines => Topology::Lines,
        Mode::LineStrip => Topology::LineStrip,
        Mode::Triangles => Topology::Triangles,
        Mode::LineLoop | Mode::TriangleStrip | Mode::TriangleFan => Topology::Unsupported,
    }
}
