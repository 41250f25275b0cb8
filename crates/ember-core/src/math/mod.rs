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

//! Provides the math value types consumed by the renderer.
//!
//! Matrices are column-major and act on column vectors. Composition helpers
//! such as [`Mat4::concatenate`] read left to right: `a.concatenate(&b)`
//! applies `a` first, then `b`.

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

pub use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

pub mod matrix;
pub mod rect;
pub mod vector;

pub use self::matrix::Mat4;
pub use self::rect::{Color, Rect};
pub use self::vector::{Vec2, Vec3, Vec4};

/// Checks if two `f32` values are approximately equal using [`EPSILON`].
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}
