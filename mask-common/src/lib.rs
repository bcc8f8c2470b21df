//! Shared types and the face masking pass for masked mesh export
//!
//! This crate holds everything that does not touch the file system:
//! - [`engine`] - per-submesh face filtering against a mask texture
//! - [`import`] - the whole-mesh import pass and its diagnostics cache
//! - [`compact`] - removal of vertices left unreferenced by filtering
//! - [`sampler`] - the texture sampling seam and the RGBA8 [`MaskImage`]
//! - [`mesh`] - the mesh model and the [`MeshAccessor`] seam
//! - [`formats`] - `.maskmesh` binary headers

pub mod compact;
pub mod engine;
pub mod error;
pub mod formats;
pub mod import;
pub mod mesh;
pub mod sampler;
pub mod setting;
pub mod topology;

/// Number of UV channels a mesh can carry.
pub const MAX_UV_CHANNELS: usize = 8;

/// File extension of exported masked meshes.
pub const MASK_MESH_EXT: &str = "maskmesh";

pub use compact::compact_vertices;
pub use engine::{filter_faces, FilterOutcome};
pub use error::{FormatError, MaskError, MaskResult, SettingError};
pub use import::{
    AssetId, ImportMessage, ImportOptions, ImportOutput, ImportResults, MaskImporter,
    MessageLevel,
};
pub use mesh::{Aabb, Mesh, MeshAccessor, SubMesh};
pub use sampler::{MaskImage, TextureSampler, WrapMode};
pub use setting::{ColorChannel, MaskSetting, DEFAULT_THRESHOLD};
pub use topology::Topology;
