//! Fixed cube meshes and the vertex formats the samples feed the input assembler.

use std::ffi::CStr;
use std::mem::offset_of;

use bytemuck::Pod;
use bytemuck::Zeroable;

use crate::model::PositionNormalUv;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementFormat {
    Float2,
    Float3,
    Float4,
}

impl ElementFormat {
    pub fn byte_size(self) -> u32 {
        match self {
            ElementFormat::Float2 => 8,
            ElementFormat::Float3 => 12,
            ElementFormat::Float4 => 16,
        }
    }
}

/// One entry of an input layout: which semantic, what shape, where in the vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexElement {
    pub semantic: &'static CStr,
    pub format: ElementFormat,
    pub offset: u32,
}

pub trait VertexLayout: Pod {
    const ELEMENTS: &'static [VertexElement];

    fn stride() -> u32 {
        std::mem::size_of::<Self>() as u32
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VertexPositionColor {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl VertexLayout for VertexPositionColor {
    const ELEMENTS: &'static [VertexElement] = &[
        VertexElement {
            semantic: c"POSITION",
            format: ElementFormat::Float3,
            offset: offset_of!(VertexPositionColor, position) as u32,
        },
        VertexElement {
            semantic: c"COLOR",
            format: ElementFormat::Float3,
            offset: offset_of!(VertexPositionColor, color) as u32,
        },
    ];
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VertexNormalUv {
    pub position: [f32; 4],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl VertexLayout for VertexNormalUv {
    const ELEMENTS: &'static [VertexElement] = &[
        VertexElement {
            semantic: c"POSITION",
            format: ElementFormat::Float4,
            offset: offset_of!(VertexNormalUv, position) as u32,
        },
        VertexElement {
            semantic: c"NORMAL",
            format: ElementFormat::Float3,
            offset: offset_of!(VertexNormalUv, normal) as u32,
        },
        VertexElement {
            semantic: c"TEXCOORD",
            format: ElementFormat::Float2,
            offset: offset_of!(VertexNormalUv, tex_coord) as u32,
        },
    ];
}

impl VertexLayout for PositionNormalUv {
    const ELEMENTS: &'static [VertexElement] = &[
        VertexElement {
            semantic: c"POSITION",
            format: ElementFormat::Float3,
            offset: offset_of!(PositionNormalUv, position) as u32,
        },
        VertexElement {
            semantic: c"NORMAL",
            format: ElementFormat::Float3,
            offset: offset_of!(PositionNormalUv, normal) as u32,
        },
        VertexElement {
            semantic: c"TEXCOORD",
            format: ElementFormat::Float2,
            offset: offset_of!(PositionNormalUv, uv) as u32,
        },
    ];
}

/// Clockwise winding when viewed from outside, matching back-face culling
/// with `FrontCounterClockwise = false`.
pub const CUBE_INDICES: [u16; 36] = [
    0, 1, 2, 0, 2, 3, // front
    4, 6, 5, 4, 7, 6, // back
    4, 5, 1, 4, 1, 0, // left
    3, 2, 6, 3, 6, 7, // right
    1, 5, 6, 1, 6, 2, // top
    4, 0, 3, 4, 3, 7, // bottom
];

const CUBE_CORNERS: [[f32; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [1.0, 1.0, -1.0],
    [1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, -1.0, 1.0],
];

/// Each corner is colored by its own position mapped into 0..1.
pub fn colored_cube_vertices() -> [VertexPositionColor; 8] {
    CUBE_CORNERS.map(|position| VertexPositionColor {
        position,
        color: position.map(|c| (c + 1.0) * 0.5),
    })
}

pub fn normal_uv_cube_vertices() -> [VertexNormalUv; 8] {
    CUBE_CORNERS.map(|[x, y, z]| VertexNormalUv {
        position: [x, y, z, 1.0],
        normal: [0.0, 0.0, 1.0],
        tex_coord: [0.0, 0.0],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_layout_fits<V: VertexLayout>() {
        let mut end = 0;
        for element in V::ELEMENTS {
            assert!(element.offset >= end, "{:?} overlaps", element.semantic);
            end = element.offset + element.format.byte_size();
        }
        assert_eq!(end, V::stride());
    }

    #[test]
    fn layouts_cover_the_whole_vertex() {
        assert_layout_fits::<VertexPositionColor>();
        assert_layout_fits::<VertexNormalUv>();
        assert_layout_fits::<PositionNormalUv>();
        assert_eq!(VertexNormalUv::stride(), 36);
        assert_eq!(VertexPositionColor::stride(), 24);
    }

    #[test]
    fn cube_indices_form_twelve_triangles_over_eight_corners() {
        assert_eq!(CUBE_INDICES.len() / 3, 12);
        assert!(CUBE_INDICES.iter().all(|&i| (i as usize) < CUBE_CORNERS.len()));
        for corner in 0..8u16 {
            assert!(CUBE_INDICES.contains(&corner));
        }
    }

    #[test]
    fn corner_colors_follow_position() {
        let vertices = colored_cube_vertices();
        assert_eq!(vertices[0].color, [0.0, 0.0, 0.0]);
        assert_eq!(vertices[6].color, [1.0, 1.0, 1.0]);
        assert_eq!(vertices[2].color, [1.0, 1.0, 0.0]);
    }

    #[test]
    fn normal_uv_cube_uses_homogeneous_positions() {
        let vertices = normal_uv_cube_vertices();
        assert!(vertices.iter().all(|v| v.position[3] == 1.0));
        assert_eq!(vertices[7].position, [1.0, -1.0, 1.0, 1.0]);
    }
}
