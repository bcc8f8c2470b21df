//! Mesh loading for the mask pass

mod gltf;
mod obj;

pub use self::gltf::load_gltf;
pub use self::obj::{load_obj, parse_obj};

use anyhow::{bail, Result};
use mask_common::Mesh;
use std::path::Path;

/// Load a mesh, picking the loader from the file extension.
pub fn load_mesh(input: &Path) -> Result<Mesh> {
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let mesh = match ext.as_str() {
        "gltf" | "glb" => load_gltf(input)?,
        "obj" => load_obj(input)?,
        _ => bail!("Unsupported mesh format: {}", ext),
    };

    mesh.validate()?;
    Ok(mesh)
}
