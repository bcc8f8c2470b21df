//! mask-export library
//!
//! File-facing side of the face masking pass: mesh and mask loading,
//! manifest builds and `.maskmesh` output, for use by the CLI and tests.

pub mod export;
pub mod formats;
pub mod manifest;
pub mod mesh;
pub mod texture;

pub use export::{export_mesh, load_settings, load_source, MaskSource};
pub use formats::{read_mask_mesh, write_mask_mesh};
pub use mesh::load_mesh;
pub use texture::load_mask;

// Re-export the extension so callers name outputs consistently
pub use mask_common::MASK_MESH_EXT;
