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

//! Transform matrix slots and the shader uniforms they are uploaded to.

/// One of the six transform matrices tracked by the renderer.
///
/// `World`, `View` and `Projection` are set by the caller; the other three are
/// derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatrixType {
    /// Object space to world space.
    World,
    /// World space to view space.
    View,
    /// View space to clip space.
    Projection,
    /// `View` then `Projection`.
    ViewProj,
    /// `World` then `View`.
    WorldView,
    /// `World` then `View` then `Projection`.
    WorldViewProj,
}

impl MatrixType {
    /// Number of matrix slots.
    pub const COUNT: usize = 6;

    /// Every matrix slot, in declaration order.
    pub const ALL: [MatrixType; Self::COUNT] = [
        MatrixType::World,
        MatrixType::View,
        MatrixType::Projection,
        MatrixType::ViewProj,
        MatrixType::WorldView,
        MatrixType::WorldViewProj,
    ];

    /// Returns `true` for the slots computed from other slots.
    #[inline]
    pub const fn is_derived(self) -> bool {
        matches!(
            self,
            MatrixType::ViewProj | MatrixType::WorldView | MatrixType::WorldViewProj
        )
    }

    /// The shader uniform this matrix is uploaded to.
    #[inline]
    pub const fn uniform(self) -> ShaderUniform {
        match self {
            MatrixType::World => ShaderUniform::WorldMatrix,
            MatrixType::View => ShaderUniform::ViewMatrix,
            MatrixType::Projection => ShaderUniform::ProjMatrix,
            MatrixType::ViewProj => ShaderUniform::ViewProjMatrix,
            MatrixType::WorldView => ShaderUniform::WorldViewMatrix,
            MatrixType::WorldViewProj => ShaderUniform::WorldViewProjMatrix,
        }
    }
}

/// A well-known uniform a shader may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShaderUniform {
    /// The projection matrix.
    ProjMatrix,
    /// The view matrix.
    ViewMatrix,
    /// The world matrix.
    WorldMatrix,
    /// The combined view-projection matrix.
    ViewProjMatrix,
    /// The combined world-view matrix.
    WorldViewMatrix,
    /// The combined world-view-projection matrix.
    WorldViewProjMatrix,
}
