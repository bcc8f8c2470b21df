//! Binary asset formats for masked meshes
//!
//! POD little-endian headers, no magic bytes.

mod mesh;
mod serialization;

pub use mesh::{MaskMeshHeader, SubMeshHeader, ATTRIBUTE_COLORS, ATTRIBUTE_NORMALS};
pub use serialization::BinarySerializable;
