//! Generators for small source assets used by the integration tests

use std::path::{Path, PathBuf};

/// 2x1 mask: opaque on the left texel, transparent on the right.
pub fn generate_split_mask_png(path: &Path) -> image::ImageResult<()> {
    let img = image::RgbaImage::from_fn(2, 1, |x, _| {
        if x == 0 {
            image::Rgba([255, 255, 255, 255])
        } else {
            image::Rgba([0, 0, 0, 0])
        }
    });
    img.save(path)
}

/// Two quads side by side. The left quad covers u in [0, 0.5], the right
/// quad u in [0.5, 1].
pub fn generate_two_quads_obj(path: &Path) -> std::io::Result<()> {
    let obj = "\
# two quads
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 2 0 0
v 2 1 0
vt 0 0
vt 0.5 0
vt 0.5 1
vt 0 1
vt 1 0
vt 1 1
f 1/1 2/2 3/3 4/4
f 2/2 5/5 6/6 3/3
";
    std::fs::write(path, obj)
}

/// One triangle with UVs, no material groups.
pub fn generate_triangle_obj(path: &Path) -> std::io::Result<()> {
    std::fs::write(
        path,
        "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nf 1/1 2/2 3/3\n",
    )
}

/// glTF with one mesh and two non-indexed primitives sharing an accessor
/// set: a triangle list (two triangles) and a point list (six points).
///
/// The first triangle and the first three points sit on the left half of
/// UV space, the rest on the right half.
pub fn generate_two_primitive_gltf(dir: &Path) -> std::io::Result<PathBuf> {
    let positions: [[f32; 3]; 6] = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [2.0, 0.0, 0.0],
        [3.0, 0.0, 0.0],
        [2.0, 1.0, 0.0],
    ];
    let uvs: [[f32; 2]; 6] = [
        [0.1, 0.5],
        [0.4, 0.5],
        [0.25, 0.5],
        [0.6, 0.5],
        [0.9, 0.5],
        [0.75, 0.5],
    ];

    let mut bin = Vec::new();
    for p in positions.iter().flatten() {
        bin.extend_from_slice(&p.to_le_bytes());
    }
    let uv_offset = bin.len();
    for uv in uvs.iter().flatten() {
        bin.extend_from_slice(&uv.to_le_bytes());
    }
    std::fs::write(dir.join("pair.bin"), &bin)?;

    let json = format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "buffers": [{{ "uri": "pair.bin", "byteLength": {total} }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": {uv_offset} }},
    {{ "buffer": 0, "byteOffset": {uv_offset}, "byteLength": {uv_len} }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 6, "type": "VEC3",
       "min": [0.0, 0.0, 0.0], "max": [3.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5126, "count": 6, "type": "VEC2" }}
  ],
  "meshes": [{{
    "name": "pair",
    "primitives": [
      {{ "attributes": {{ "POSITION": 0, "TEXCOORD_0": 1 }}, "mode": 4 }},
      {{ "attributes": {{ "POSITION": 0, "TEXCOORD_0": 1 }}, "mode": 0 }}
    ]
  }}]
}}"#,
        total = bin.len(),
        uv_offset = uv_offset,
        uv_len = bin.len() - uv_offset,
    );

    let path = dir.join("pair.gltf");
    std::fs::write(&path, json)?;
    Ok(path)
}
