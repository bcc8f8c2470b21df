//! Submesh primitive topology and face-group sizing.

use std::fmt;

/// Primitive topology of a submesh index list.
///
/// Stored as a `u8` in `.maskmesh` files, see [`Topology::to_u8`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Topology {
    Points,
    LineStrip,
    Lines,
    #[default]
    Triangles,
    Quads,
    /// Any topology the mask pass cannot group into faces (strips, fans, loops).
    Unsupported,
}

impl Topology {
    /// Number of indices forming one face group.
    ///
    /// Line strips are grouped per index, the same way points are.
    /// Returns 0 for [`Topology::Unsupported`], which the mask pass leaves untouched.
    pub const fn group_size(self) -> usize {
        match self {
            Topology::Points | Topology::LineStrip => 1,
            Topology::Lines => 2,
            Topology::Triangles => 3,
            Topology::Quads => 4,
            Topology::Unsupported => 0,
        }
    }

    pub const fn is_supported(self) -> bool {
        self.group_size() != 0
    }

    /// Number of complete face groups in an index list of `index_count` entries.
    pub const fn group_count(self, index_count: usize) -> usize {
        match self.group_size() {
            0 => 0,
            size => index_count / size,
        }
    }

    pub const fn to_u8(self) -> u8 {
        match self {
            Topology::Points => 0,
            Topology::LineStrip => 1,
            Topology::Lines => 2,
            Topology::Triangles => 3,
            Topology::Quads => 4,
            Topology::Unsupported => 255,
        }
    }

    /// Unknown values decode as [`Topology::Unsupported`].
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Topology::Points,
            1 => Topology::LineStrip,
            2 => Topology::Lines,
            3 => Topology::Triangles,
            4 => Topology::Quads,
            _ => Topology::Unsupported,
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Topology::Points => "Points",
            Topology::LineStrip => "LineStrip",
            Topology::Lines => "Lines",
            Topology::Triangles => "Triangles",
            Topology::Quads => "Quads",
            Topology::Unsupported => "Unsupported",
        };
        f.write_str(name)
    }
}
