//! Binary serialization trait for format headers.
//!
//! Both `.maskmesh` headers implement `BinarySerializable` so readers and
//! writers can walk a run of headers generically. Each header keeps its
//! type-specific `to_bytes()` returning a fixed-size array.

/// Trait for binary-serializable format headers.
///
/// Uses `Vec<u8>` for the return type because associated const generics in
/// return types (`[u8; Self::SIZE]`) are not yet stable in Rust.
///
/// # Example
///
/// ```
/// use mask_common::formats::{BinarySerializable, MaskMeshHeader};
///
/// let header = MaskMeshHeader::new(64, 2, 0b1, 0);
/// let bytes = header.serialize();
/// let parsed = MaskMeshHeader::deserialize(&bytes).unwrap();
/// assert_eq!(parsed, header);
/// ```
pub trait BinarySerializable: Sized {
    /// Size of the serialized header in bytes.
    const SIZE: usize;

    fn serialize(&self) -> Vec<u8>;

    /// Returns `None` if the byte slice is too short.
    fn deserialize(bytes: &[u8]) -> Option<Self>;

    /// Deserialize `count` consecutive headers.
    fn deserialize_many(bytes: &[u8], count: usize) -> Option<Vec<Self>> {
        let needed = Self::SIZE.checked_mul(count)?;
        if bytes.len() < needed {
            return None;
        }
        bytes[..needed]
            .chunks_exact(Self::SIZE)
            .map(Self::deserialize)
            .collect()
    }
}

impl BinarySerializable for super::MaskMeshHeader {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}

impl BinarySerializable for super::SubMeshHeader {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::SubMeshHeader;
    use crate::mesh::Aabb;
    use crate::topology::Topology;

    #[test]
    fn test_deserialize_many() {
        let headers = [
            SubMeshHeader::new(Topology::Triangles, 0, 6, Aabb::default()),
            SubMeshHeader::new(Topology::Lines, 6, 4, Aabb::default()),
        ];
        let bytes: Vec<u8> = headers.iter().flat_map(|h| h.serialize()).collect();
        let parsed = SubMeshHeader::deserialize_many(&bytes, 2).unwrap();
        assert_eq!(parsed, headers.to_vec());
        assert!(SubMeshHeader::deserialize_many(&bytes, 3).is_none());
    }
}
