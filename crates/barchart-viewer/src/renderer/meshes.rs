//! Static meshes, as non-indexed triangle lists.

use crate::data::types::MeshVertex;
use std::f32::consts::TAU;

/// Unit cube centred on the origin, outward normals, CCW faces.
pub fn unit_cube() -> Vec<MeshVertex> {
    // (normal, u axis, v axis) per face; u x v == normal keeps the winding CCW.
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];

    let mut out = Vec::with_capacity(36);
    for (n, u, v) in faces {
        let corner = |su: f32, sv: f32| MeshVertex {
            position: [
                0.5 * n[0] + su * 0.5 * u[0] + sv * 0.5 * v[0],
                0.5 * n[1] + su * 0.5 * u[1] + sv * 0.5 * v[1],
                0.5 * n[2] + su * 0.5 * u[2] + sv * 0.5 * v[2],
            ],
            normal: n,
        };
        let (a, b, c, d) = (
            corner(-1.0, -1.0),
            corner(1.0, -1.0),
            corner(1.0, 1.0),
            corner(-1.0, 1.0),
        );
        out.extend_from_slice(&[a, b, c, a, c, d]);
    }
    out
}

/// Square in the XZ plane facing +Y, side `extent`.
pub fn ground_plane(extent: f32) -> Vec<MeshVertex> {
    let h = extent / 2.0;
    let v = |x: f32, z: f32| MeshVertex {
        position: [x, 0.0, z],
        normal: [0.0, 1.0, 0.0],
    };
    // Seen from above: (-h, h) → (h, h) → (h, -h) is CCW.
    vec![v(-h, h), v(h, h), v(h, -h), v(-h, h), v(h, -h), v(-h, -h)]
}

/// Flat ring in the XZ plane facing +Y.
pub fn ring(inner: f32, outer: f32, segments: u32) -> Vec<MeshVertex> {
    let segments = segments.max(3);
    let v = |r: f32, a: f32| MeshVertex {
        position: [r * a.cos(), 0.0, -r * a.sin()],
        normal: [0.0, 1.0, 0.0],
    };

    let mut out = Vec::with_capacity(segments as usize * 6);
    for i in 0..segments {
        let a0 = TAU * i as f32 / segments as f32;
        let a1 = TAU * (i + 1) as f32 / segments as f32;
        let (i0, o0, i1, o1) = (v(inner, a0), v(outer, a0), v(inner, a1), v(outer, a1));
        out.extend_from_slice(&[i0, o0, o1, i0, o1, i1]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn tri_normal(t: &[MeshVertex]) -> Vec3 {
        let p = |i: usize| Vec3::from(t[i].position);
        (p(1) - p(0)).cross(p(2) - p(0)).normalize()
    }

    #[test]
    fn cube_faces_wind_outward() {
        let cube = unit_cube();
        assert_eq!(cube.len(), 36);
        for tri in cube.chunks(3) {
            assert!(tri_normal(tri).abs_diff_eq(Vec3::from(tri[0].normal), 1e-5));
            for v in tri {
                for c in v.position {
                    assert_eq!(c.abs(), 0.5);
                }
            }
        }
    }

    #[test]
    fn plane_and_ring_face_up() {
        for tri in ground_plane(300.0).chunks(3) {
            assert!(tri_normal(tri).abs_diff_eq(Vec3::Y, 1e-5));
        }
        let r = ring(0.12, 0.15, 32);
        assert_eq!(r.len(), 32 * 6);
        for tri in r.chunks(3) {
            assert!(tri_normal(tri).abs_diff_eq(Vec3::Y, 1e-4));
        }
    }
}
