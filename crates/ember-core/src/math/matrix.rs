// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the `Mat4` type and the composition operations the renderer relies on.

use super::{Vec3, Vec4, EPSILON};
use approx::AbsDiffEq;
use std::ops::Mul;

/// A 4x4 column-major matrix, used for 3D affine and projective transformations.
///
/// `Mat4` acts on column vectors: `m * v`. The product `a * b` therefore applies `b`
/// first. [`Mat4::concatenate`] is the left-to-right form of the same product.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Mat4 {
    /// The columns of the matrix. `cols[0]` is the first column, and so on.
    pub cols: [Vec4; 4],
}

impl Mat4 {
    /// The 4x4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
    };

    /// A 4x4 matrix with all elements set to 0.
    pub const ZERO: Self = Self {
        cols: [Vec4::ZERO; 4],
    };

    /// Creates a new matrix from four column vectors.
    #[inline]
    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self {
            cols: [c0, c1, c2, c3],
        }
    }

    /// Returns a row of the matrix as a `Vec4`.
    #[inline]
    pub fn get_row(&self, index: usize) -> Vec4 {
        Vec4::new(
            self.cols[0].get(index),
            self.cols[1].get(index),
            self.cols[2].get(index),
            self.cols[3].get(index),
        )
    }

    /// Creates a translation matrix.
    #[inline]
    pub fn from_translation(v: Vec3) -> Self {
        Self::from_cols(Vec4::X, Vec4::Y, Vec4::Z, v.extend(1.0))
    }

    /// Creates a non-uniform scaling matrix.
    #[inline]
    pub fn from_scale(scale: Vec3) -> Self {
        Self::from_cols(
            Vec4::new(scale.x, 0.0, 0.0, 0.0),
            Vec4::new(0.0, scale.y, 0.0, 0.0),
            Vec4::new(0.0, 0.0, scale.z, 0.0),
            Vec4::W,
        )
    }

    /// Creates a rotation around the Z-axis.
    #[inline]
    pub fn from_rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols(
            Vec4::new(c, s, 0.0, 0.0),
            Vec4::new(-s, c, 0.0, 0.0),
            Vec4::Z,
            Vec4::W,
        )
    }

    /// Creates a right-handed perspective projection matrix with a [0, 1] depth range.
    ///
    /// # Arguments
    ///
    /// * `fov_y_radians`: The vertical field of view in radians.
    /// * `aspect_ratio`: Width divided by height of the viewport.
    /// * `z_near`: Distance to the near clipping plane. Must be positive.
    /// * `z_far`: Distance to the far clipping plane. Must be greater than `z_near`.
    #[inline]
    pub fn perspective_rh_zo(fov_y_radians: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        let f = 1.0 / (fov_y_radians / 2.0).tan();
        let cc = z_far / (z_near - z_far);
        let dd = (z_near * z_far) / (z_near - z_far);

        Self::from_cols(
            Vec4::new(f / aspect_ratio, 0.0, 0.0, 0.0),
            Vec4::new(0.0, f, 0.0, 0.0),
            Vec4::new(0.0, 0.0, cc, -1.0),
            Vec4::new(0.0, 0.0, dd, 0.0),
        )
    }

    /// Returns the transpose of the matrix.
    #[inline]
    pub fn transpose(&self) -> Self {
        Self::from_cols(self.get_row(0), self.get_row(1), self.get_row(2), self.get_row(3))
    }

    /// Returns `true` if the bottom row is `(0, 0, 0, 1)`.
    #[inline]
    pub fn is_affine(&self) -> bool {
        self.get_row(3).abs_diff_eq(&Vec4::W, EPSILON)
    }

    /// Composes two transforms so that `self` is applied first, then `next`.
    ///
    /// Equivalent to `next * self`.
    #[inline]
    pub fn concatenate(&self, next: &Mat4) -> Self {
        *next * *self
    }

    /// Composes two affine transforms so that `self` is applied first, then `next`.
    ///
    /// Only the upper 3x4 block of both operands is read; the bottom row of the
    /// result is forced to `(0, 0, 0, 1)`. For affine inputs this matches
    /// [`Mat4::concatenate`] with fewer multiplications.
    pub fn concatenate_affine(&self, next: &Mat4) -> Self {
        let mut cols = [Vec4::ZERO; 4];
        for (c, col) in cols.iter_mut().enumerate() {
            let src = self.cols[c];
            let mut out = Vec3::ZERO;
            for (k, weight) in [src.x, src.y, src.z].into_iter().enumerate() {
                out = out + next.cols[k].truncate() * weight;
            }
            *col = if c == 3 {
                (out + next.cols[3].truncate()).extend(1.0)
            } else {
                out.extend(0.0)
            };
        }
        Self { cols }
    }

    /// Returns the 16 elements in column-major order, ready for a uniform upload.
    #[inline]
    pub fn to_cols_array(&self) -> [f32; 16] {
        bytemuck::cast(*self)
    }
}

impl Default for Mat4 {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Self;
    /// Multiplies this matrix by another `Mat4`. The result applies `rhs` first.
    #[inline]
    fn mul(self, rhs: Mat4) -> Self::Output {
        let mut cols = [Vec4::ZERO; 4];
        for (col, rhs_col) in cols.iter_mut().zip(rhs.cols) {
            *col = self * rhs_col;
        }
        Mat4 { cols }
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    #[inline]
    fn mul(self, v: Vec4) -> Vec4 {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z + self.cols[3] * v.w
    }
}

impl AbsDiffEq for Mat4 {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.cols
            .iter()
            .zip(other.cols.iter())
            .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{approx_eq, PI};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_identity_default() {
        assert_eq!(Mat4::default(), Mat4::IDENTITY);
        let m = Mat4::from_scale(Vec3::new(1.0, 2.0, 3.0));
        assert_abs_diff_eq!(m * Mat4::IDENTITY, m);
        assert_abs_diff_eq!(Mat4::IDENTITY * m, m);
    }

    #[test]
    fn test_concatenate_applies_left_operand_first() {
        let t = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        let s = Mat4::from_scale(Vec3::new(2.0, 2.0, 2.0));
        let p = Vec4::new(1.0, 0.0, 0.0, 1.0);

        // Scale then translate: (1 * 2) + 10
        let m = s.concatenate(&t);
        assert!(approx_eq((m * p).x, 12.0));

        // Translate then scale: (1 + 10) * 2
        let m = t.concatenate(&s);
        assert!(approx_eq((m * p).x, 22.0));
    }

    #[test]
    fn test_concatenate_affine_matches_full_product() {
        let a = Mat4::from_rotation_z(PI / 6.0).concatenate(&Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)));
        let b = Mat4::from_scale(Vec3::new(0.5, 2.0, 1.0)).concatenate(&Mat4::from_translation(Vec3::new(-4.0, 0.0, 7.0)));

        assert!(a.is_affine() && b.is_affine());
        assert_abs_diff_eq!(a.concatenate_affine(&b), a.concatenate(&b));
    }

    #[test]
    fn test_perspective_rh_zo() {
        let (fov, aspect, near, far) = (PI / 4.0, 16.0 / 9.0, 0.1, 100.0);
        let m = Mat4::perspective_rh_zo(fov, aspect, near, far);
        assert!(approx_eq(m.cols[0].x, 1.0 / (aspect * (fov / 2.0).tan())));
        assert!(approx_eq(m.cols[2].z, -far / (far - near)));
        assert!(approx_eq(m.cols[3].z, -(far * near) / (far - near)));
        assert!(!m.is_affine());
    }

    #[test]
    fn test_transpose_and_cols_array() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let raw = m.to_cols_array();
        assert_eq!(&raw[12..16], &[1.0, 2.0, 3.0, 1.0]);
        assert_eq!(m.transpose().get_row(3), Vec4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(m.transpose().transpose(), m);
    }
}
