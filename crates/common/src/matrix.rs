use glam::Mat4;
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// 4x4 single-precision matrix stored row-major.
///
/// Composition is implemented by hand so that callers that only need
/// "view times model" do not depend on a particular math library's
/// storage order. Use [`Matrix4::to_column_major`] when handing the matrix
/// to a graphics API that expects columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix4([f32; 16]);

impl Matrix4 {
    #[rustfmt::skip]
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ]);

    /// Build from 16 elements in row-major order.
    pub const fn from_rows(elements: [f32; 16]) -> Self {
        Self(elements)
    }

    /// Build from 16 elements in column-major order (GL / glam layout).
    pub fn from_column_major(elements: [f32; 16]) -> Self {
        Self(elements).transpose()
    }

    /// Pure translation.
    #[rustfmt::skip]
    pub const fn translation(x: f32, y: f32, z: f32) -> Self {
        Self([
            1.0, 0.0, 0.0, x,
            0.0, 1.0, 0.0, y,
            0.0, 0.0, 1.0, z,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotation about the Y axis, right-handed, angle in radians.
    #[rustfmt::skip]
    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self([
              c, 0.0,   s, 0.0,
            0.0, 1.0, 0.0, 0.0,
             -s, 0.0,   c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    pub fn as_rows(&self) -> &[f32; 16] {
        &self.0
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.0[row * 4 + col]
    }

    /// `self * rhs`, summing over the contraction index for every cell.
    pub fn multiply(&self, rhs: &Self) -> Self {
        let mut out = [0.0f32; 16];
        for row in 0..4 {
            for col in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.0[row * 4 + k] * rhs.0[k * 4 + col];
                }
                out[row * 4 + col] = sum;
            }
        }
        Self(out)
    }

    pub fn transpose(&self) -> Self {
        let mut out = [0.0f32; 16];
        for row in 0..4 {
            for col in 0..4 {
                out[col * 4 + row] = self.0[row * 4 + col];
            }
        }
        Self(out)
    }

    /// Elements in column-major order, as `glUniformMatrix4fv` expects
    /// with `transpose = false`.
    pub fn to_column_major(&self) -> [f32; 16] {
        self.transpose().0
    }

    /// Transform a point (w = 1) and return the xyz of the result.
    pub fn transform_point(&self, p: [f32; 3]) -> [f32; 3] {
        let m = &self.0;
        [
            m[0] * p[0] + m[1] * p[1] + m[2] * p[2] + m[3],
            m[4] * p[0] + m[5] * p[1] + m[6] * p[2] + m[7],
            m[8] * p[0] + m[9] * p[1] + m[10] * p[2] + m[11],
        ]
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Matrix4 {
        self.multiply(&rhs)
    }
}

impl From<Mat4> for Matrix4 {
    fn from(m: Mat4) -> Self {
        Self::from_column_major(m.to_cols_array())
    }
}

impl From<Matrix4> for Mat4 {
    fn from(m: Matrix4) -> Self {
        Mat4::from_cols_array(&m.to_column_major())
    }
}
