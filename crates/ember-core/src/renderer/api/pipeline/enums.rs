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

//! Enums for fixed-function pipeline configuration.

/// The topology used to assemble vertices into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimitiveMode {
    /// Every two vertices form a line.
    LineList,
    /// Each vertex after the first extends a connected line.
    LineStrip,
    /// Each vertex is a point.
    PointList,
    /// Every three vertices form a triangle.
    TriangleList,
    /// Each vertex after the second forms a triangle with the previous two.
    TriangleStrip,
    /// Each vertex after the second forms a triangle with the first and the previous one.
    TriangleFan,
}

/// A factor applied to the source or destination color during blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlendFunc {
    /// `(0, 0, 0, 0)`
    Zero,
    /// `(1, 1, 1, 1)`
    One,
    /// The source color.
    SrcColor,
    /// One minus the source color.
    InvSrcColor,
    /// The source alpha.
    SrcAlpha,
    /// One minus the source alpha.
    InvSrcAlpha,
    /// The destination color.
    DestColor,
    /// One minus the destination color.
    InvDestColor,
    /// The destination alpha.
    DestAlpha,
    /// One minus the destination alpha.
    InvDestAlpha,
}

/// Which polygon faces are culled when face culling is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FaceSide {
    /// Cull back faces.
    #[default]
    Back,
    /// Cull front faces.
    Front,
    /// Cull both faces.
    FrontAndBack,
}

/// How polygons are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FaceFilling {
    /// Polygon vertices are drawn as points.
    Point,
    /// Polygon edges are drawn as lines.
    Line,
    /// Polygons are filled.
    #[default]
    Fill,
}

/// A comparison function used for depth and stencil testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareFunction {
    /// The test never passes.
    Never,
    /// Passes if the new value is less than the existing value.
    Less,
    /// Passes if the new value is equal to the existing value.
    Equal,
    /// Passes if the new value is less than or equal to the existing value.
    LessOrEqual,
    /// Passes if the new value is greater than the existing value.
    Greater,
    /// Passes if the new value is not equal to the existing value.
    NotEqual,
    /// Passes if the new value is greater than or equal to the existing value.
    GreaterOrEqual,
    /// The test always passes.
    #[default]
    Always,
}

/// An operation to perform on the stencil buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StencilOperation {
    /// Keep the current value.
    #[default]
    Keep,
    /// Set the value to 0.
    Zero,
    /// Replace the value with the reference value.
    Replace,
    /// Increment the value, clamping at the maximum.
    Increment,
    /// Increment the value, wrapping to 0 on overflow.
    IncrementNoClamp,
    /// Decrement the value, clamping at 0.
    Decrement,
    /// Decrement the value, wrapping to the maximum on underflow.
    DecrementNoClamp,
    /// Bitwise invert the value.
    Invert,
}

/// A boolean pipeline toggle addressed through `Enable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RendererParameter {
    /// Color blending.
    Blend,
    /// Writes to the color buffer.
    ColorWrite,
    /// Depth testing.
    DepthBuffer,
    /// Writes to the depth buffer.
    DepthWrite,
    /// Face culling.
    FaceCulling,
    /// Scissor testing.
    ScissorTest,
    /// Stencil testing.
    StencilTest,
}

impl RendererParameter {
    /// Every parameter, in declaration order.
    pub const ALL: [RendererParameter; 7] = [
        RendererParameter::Blend,
        RendererParameter::ColorWrite,
        RendererParameter::DepthBuffer,
        RendererParameter::DepthWrite,
        RendererParameter::FaceCulling,
        RendererParameter::ScissorTest,
        RendererParameter::StencilTest,
    ];
}
