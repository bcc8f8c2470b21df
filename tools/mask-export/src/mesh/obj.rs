//! OBJ mesh loading

use anyhow::{bail, Context, Result};
use glam::{Vec2, Vec3};
use mask_common::{Mesh, SubMesh, Topology};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Load an OBJ file.
///
/// `usemtl`, `g` and `o` start a new submesh, as does a change of primitive
/// kind. Triangles and quads keep their shape, larger polygons are fan
/// triangulated. `l` with two vertices emits lines, longer `l` a line strip,
/// and `p` emits points. Vertices are expanded per corner.
pub fn load_obj(input: &Path) -> Result<Mesh> {
    let file = File::open(input).with_context(|| format!("Failed to open OBJ: {:?}", input))?;
    let name = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_obj(BufReader::new(file), name)
}

/// Parse OBJ text from any reader.
pub fn parse_obj<R: BufRead>(reader: R, name: String) -> Result<Mesh> {
    let mut builder = ObjBuilder::default();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "v" if parts.len() >= 4 => {
                builder.positions.push(Vec3::new(
                    parse_f32(parts[1]),
                    parse_f32(parts[2]),
                    parse_f32(parts[3]),
                ));
            }
            "vt" if parts.len() >= 3 => {
                // OBJ puts v = 0 at the bottom; masks are sampled top-down
                builder
                    .tex_coords
                    .push(Vec2::new(parse_f32(parts[1]), 1.0 - parse_f32(parts[2])));
            }
            "vn" if parts.len() >= 4 => {
                builder.normals_raw.push(Vec3::new(
                    parse_f32(parts[1]),
                    parse_f32(parts[2]),
                    parse_f32(parts[3]),
                ));
            }
            "f" => {
                let corners = parse_corners(&parts[1..]);
                match corners.len() {
                    0..=2 => tracing::warn!(
                        "Skipping degenerate face on line {}",
                        line_number + 1
                    ),
                    3 => builder.emit(Topology::Triangles, &corners),
                    4 => builder.emit(Topology::Quads, &corners),
                    n => {
                        // Fan triangulation for convex polygons
                        for i in 1..n - 1 {
                            builder.emit(
                                Topology::Triangles,
                                &[corners[0], corners[i], corners[i + 1]],
                            );
                        }
                    }
                }
            }
            "l" => {
                let corners = parse_corners(&parts[1..]);
                match corners.len() {
                    0 | 1 => tracing::warn!("Skipping degenerate line on line {}", line_number + 1),
                    2 => builder.emit(Topology::Lines, &corners),
                    _ => {
                        // Every polyline is its own strip
                        builder.split();
                        builder.emit(Topology::LineStrip, &corners);
                        builder.split();
                    }
                }
            }
            "p" => {
                for corner in parse_corners(&parts[1..]) {
                    builder.emit(Topology::Points, &[corner]);
                }
            }
            "usemtl" | "g" | "o" => builder.split(),
            _ => {}
        }
    }

    builder.finish(name)
}

/// One face corner: position, texture and normal references (0-based).
type Corner = (usize, Option<usize>, Option<usize>);

#[derive(Default)]
struct ObjBuilder {
    positions: Vec<Vec3>,
    tex_coords: Vec<Vec2>,
    normals_raw: Vec<Vec3>,

    // Final vertex data (expanded from corners)
    final_positions: Vec<Vec3>,
    final_uvs: Vec<Vec2>,
    final_normals: Vec<Vec3>,
    any_uvs: bool,
    any_normals: bool,

    submeshes: Vec<SubMesh>,
    current: Option<SubMesh>,
}

impl ObjBuilder {
    /// Append one primitive, starting a new submesh when the kind changes.
    fn emit(&mut self, topology: Topology, corners: &[Corner]) {
        if self.current.as_ref().is_some_and(|s| s.topology != topology) {
            self.split();
        }
        let base_vertex = self.final_positions.len() as u32;
        let current = self
            .current
            .get_or_insert_with(|| SubMesh::new(topology, Vec::new(), base_vertex));

        for &(vi, vti, vni) in corners {
            let index = self.final_positions.len() as u32 - current.base_vertex;
            current.indices.push(index);

            self.final_positions
                .push(self.positions.get(vi).copied().unwrap_or(Vec3::ZERO));
            self.any_uvs |= vti.is_some();
            self.final_uvs.push(
                vti.and_then(|ti| self.tex_coords.get(ti).copied())
                    .unwrap_or(Vec2::ZERO),
            );
            self.any_normals |= vni.is_some();
            self.final_normals.push(
                vni.and_then(|ni| self.normals_raw.get(ni).copied())
                    .unwrap_or(Vec3::Y),
            );
        }
    }

    fn split(&mut self) {
        if let Some(submesh) = self.current.take() {
            self.submeshes.push(submesh);
        }
    }

    fn finish(mut self, name: String) -> Result<Mesh> {
        self.split();
        if self.final_positions.is_empty() {
            bail!("No vertices found in OBJ file");
        }

        let mut mesh = Mesh::new(name, self.final_positions);
        if self.any_uvs {
            mesh = mesh.with_uvs(0, self.final_uvs);
        }
        if self.any_normals {
            mesh.normals = Some(self.final_normals);
        }
        for submesh in self.submeshes {
            mesh = mesh.with_submesh(submesh);
        }

        tracing::info!(
            "Loaded OBJ mesh '{}': {} vertices, {} submeshes",
            mesh.name,
            mesh.positions.len(),
            mesh.submeshes.len()
        );
        Ok(mesh)
    }
}

fn parse_f32(s: &str) -> f32 {
    s.parse().unwrap_or(0.0)
}

fn parse_corners(parts: &[&str]) -> Vec<Corner> {
    parts.iter().filter_map(|v| parse_obj_vertex(v)).collect()
}

/// Parse OBJ vertex reference: "v", "v/vt", "v/vt/vn", or "v//vn"
fn parse_obj_vertex(s: &str) -> Option<Corner> {
    let parts: Vec<&str> = s.split('/').collect();

    let vi = parts.first()?.parse::<usize>().ok()?.checked_sub(1)?; // OBJ indices are 1-based

    let vti = parts
        .get(1)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<usize>().ok())
        .and_then(|i| i.checked_sub(1));

    let vni = parts
        .get(2)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<usize>().ok())
        .and_then(|i| i.checked_sub(1));

    Some((vi, vti, vni))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mask_common::MeshAccessor;

    fn parse(text: &str) -> Mesh {
        parse_obj(text.as_bytes(), "test".to_string()).unwrap()
    }

    #[test]
    fn test_triangles_with_uvs() {
        let mesh = parse(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             vt 0 0\nvt 1 0\nvt 0 1\n\
             f 1/1 2/2 3/3\n",
        );
        assert_eq!(mesh.submeshes.len(), 1);
        assert_eq!(mesh.topology(0), Topology::Triangles);
        assert_eq!(mesh.indices(0), &[0, 1, 2]);
        // v flipped to top-down
        assert_eq!(mesh.uvs(0).unwrap()[0], Vec2::new(0.0, 1.0));
        assert_eq!(mesh.uvs(0).unwrap()[2], Vec2::new(0.0, 0.0));
        assert!(mesh.normals.is_none());
    }

    #[test]
    fn test_quads_and_kind_changes_split_submeshes() {
        let mesh = parse(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv 2 2 0\n\
             f 1 2 3 4\n\
             f 1 2 3\n\
             l 1 5\n\
             l 1 2 3\n\
             p 4 5\n",
        );
        let topologies: Vec<Topology> = mesh.submeshes.iter().map(|s| s.topology).collect();
        assert_eq!(
            topologies,
            vec![
                Topology::Quads,
                Topology::Triangles,
                Topology::Lines,
                Topology::LineStrip,
                Topology::Points,
            ]
        );
        assert_eq!(mesh.base_vertex(1), 4);
        assert_eq!(mesh.indices(1), &[0, 1, 2]);
        assert_eq!(mesh.indices(4), &[0, 1]);
        assert_eq!(mesh.positions.len(), 4 + 3 + 2 + 3 + 2);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_polygon_fan_triangulation() {
        let mesh = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv -1 0 0\nf 1 2 3 4 5\n");
        assert_eq!(mesh.submeshes.len(), 1);
        assert_eq!(mesh.indices(0).len(), 9);
    }

    #[test]
    fn test_usemtl_starts_submesh() {
        let mesh = parse(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             usemtl a\nf 1 2 3\nf 1 2 3\n\
             usemtl b\nf 1 2 3\n",
        );
        assert_eq!(mesh.submeshes.len(), 2);
        assert_eq!(mesh.indices(0).len(), 6);
        assert_eq!(mesh.base_vertex(1), 6);
    }

    #[test]
    fn test_empty_obj_fails() {
        assert!(parse_obj("# nothing\n".as_bytes(), "empty".to_string()).is_err());
    }

    #[test]
    fn test_parse_obj_vertex() {
        assert_eq!(parse_obj_vertex("3"), Some((2, None, None)));
        assert_eq!(parse_obj_vertex("3/4"), Some((2, Some(3), None)));
        assert_eq!(parse_obj_vertex("3//5"), Some((2, None, Some(4))));
        assert_eq!(parse_obj_vertex("0"), None);
    }
}
