//! Fixed cube mesh. Never mutated.

/// Eight corners of a cube spanning -1..1 on every axis, xyz.
/// 0..4 sit on the +z face, 4..8 on the -z face.
pub const CUBE_POSITIONS: [f32; 24] = [
    -1.0, -1.0, 1.0, //
    1.0, -1.0, 1.0, //
    1.0, 1.0, 1.0, //
    -1.0, 1.0, 1.0, //
    -1.0, -1.0, -1.0, //
    1.0, -1.0, -1.0, //
    1.0, 1.0, -1.0, //
    -1.0, 1.0, -1.0, //
];

const FACE_COLORS: [[f32; 4]; 6] = [
    [1.0, 1.0, 1.0, 1.0], // front: white
    [1.0, 0.0, 0.0, 1.0], // back: red
    [0.0, 1.0, 0.0, 1.0], // top: green
    [0.0, 0.0, 1.0, 1.0], // bottom: blue
    [1.0, 1.0, 0.0, 1.0], // right: yellow
    [1.0, 0.0, 1.0, 1.0], // left: purple
];

const fn expand_face_colors() -> [f32; 96] {
    let mut out = [0.0; 96];
    let mut face = 0;
    while face < 6 {
        let mut vertex = 0;
        while vertex < 4 {
            let mut c = 0;
            while c < 4 {
                out[face * 16 + vertex * 4 + c] = FACE_COLORS[face][c];
                c += 1;
            }
            vertex += 1;
        }
        face += 1;
    }
    out
}

/// RGBA per face corner, flat per face: 6 faces x 4 corners x 4 floats.
///
/// The mesh only shares 8 vertices, so the attribute fetch reads the first
/// 8 entries; the full table is still uploaded.
pub const CUBE_COLORS: [f32; 96] = expand_face_colors();

/// Two counter-clockwise triangles per face, seen from outside.
pub const CUBE_INDICES: [u16; 36] = [
    0, 1, 2, 0, 2, 3, // front
    4, 7, 6, 4, 6, 5, // back
    3, 2, 6, 3, 6, 7, // top
    0, 4, 5, 0, 5, 1, // bottom
    1, 5, 6, 1, 6, 2, // right
    0, 3, 7, 0, 7, 4, // left
];

pub const CUBE_INDEX_COUNT: i32 = CUBE_INDICES.len() as i32;

#[cfg(test)]
mod tests {
    use super::*;

    fn corner(i: u16) -> [f32; 3] {
        let i = i as usize * 3;
        [CUBE_POSITIONS[i], CUBE_POSITIONS[i + 1], CUBE_POSITIONS[i + 2]]
    }

    #[test]
    fn sizes() {
        assert_eq!(CUBE_POSITIONS.len(), 8 * 3);
        assert_eq!(CUBE_COLORS.len(), 6 * 4 * 4);
        assert_eq!(CUBE_INDEX_COUNT, 36);
        assert!(CUBE_INDICES.iter().all(|&i| i < 8));
    }

    #[test]
    fn colors_are_flat_per_face() {
        for (face, color) in CUBE_COLORS.chunks(16).enumerate() {
            for corner in color.chunks(4) {
                assert_eq!(corner, FACE_COLORS[face]);
            }
        }
    }

    #[test]
    fn triangles_face_outward() {
        for tri in CUBE_INDICES.chunks(3) {
            let [a, b, c] = [corner(tri[0]), corner(tri[1]), corner(tri[2])];
            let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            let n = [
                u[1] * v[2] - u[2] * v[1],
                u[2] * v[0] - u[0] * v[2],
                u[0] * v[1] - u[1] * v[0],
            ];
            let centroid = [
                (a[0] + b[0] + c[0]) / 3.0,
                (a[1] + b[1] + c[1]) / 3.0,
                (a[2] + b[2] + c[2]) / 3.0,
            ];
            let dot = n[0] * centroid[0] + n[1] * centroid[1] + n[2] * centroid[2];
            assert!(dot > 0.0, "triangle {tri:?} faces inward");
        }
    }

    #[test]
    fn every_face_is_covered() {
        for axis in 0..3 {
            for sign in [-1.0_f32, 1.0] {
                let covered = CUBE_INDICES
                    .chunks(3)
                    .filter(|t| t.iter().all(|&i| corner(i)[axis] == sign))
                    .count();
                assert_eq!(covered, 2, "axis {axis} sign {sign}");
            }
        }
    }
}
