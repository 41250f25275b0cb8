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

//! The fixed-function render state block.

use super::enums::{
    BlendFunc, CompareFunction, FaceFilling, FaceSide, RendererParameter, StencilOperation,
};

/// Stencil test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StencilState {
    /// Comparison between the reference value and the stored value.
    pub compare: CompareFunction,
    /// Operation when the stencil test fails.
    pub fail: StencilOperation,
    /// Operation when both the stencil and depth tests pass.
    pub pass: StencilOperation,
    /// Operation when the stencil test passes but the depth test fails.
    pub depth_fail: StencilOperation,
    /// Reference value for the comparison.
    pub reference: u32,
    /// Mask applied to both the reference and the stored value before comparing.
    pub mask: u32,
}

impl Default for StencilState {
    fn default() -> Self {
        Self {
            compare: CompareFunction::Always,
            fail: StencilOperation::Keep,
            pass: StencilOperation::Keep,
            depth_fail: StencilOperation::Keep,
            reference: 0,
            mask: u32::MAX,
        }
    }
}

/// A value snapshot of every fixed-function toggle the renderer applies before a draw.
///
/// The block has no identity: two blocks with the same fields are interchangeable,
/// and the renderer replaces its copy wholesale on `set_render_states`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderStates {
    parameters: [bool; RendererParameter::ALL.len()],
    /// Factor applied to the incoming color.
    pub src_blend: BlendFunc,
    /// Factor applied to the color already in the target.
    pub dst_blend: BlendFunc,
    /// Faces removed when [`RendererParameter::FaceCulling`] is enabled.
    pub face_culling: FaceSide,
    /// Polygon rasterization mode.
    pub face_filling: FaceFilling,
    /// Depth comparison when [`RendererParameter::DepthBuffer`] is enabled.
    pub depth_func: CompareFunction,
    /// Stencil configuration when [`RendererParameter::StencilTest`] is enabled.
    pub stencil: StencilState,
    /// Rasterized line width, in pixels. Always strictly positive.
    pub line_width: f32,
    /// Rasterized point size, in pixels. Always strictly positive.
    pub point_size: f32,
}

impl RenderStates {
    /// Returns whether `parameter` is enabled in this block.
    #[inline]
    pub fn is_enabled(&self, parameter: RendererParameter) -> bool {
        self.parameters[parameter as usize]
    }

    /// Enables or disables `parameter`.
    #[inline]
    pub fn set_enabled(&mut self, parameter: RendererParameter, enable: bool) {
        self.parameters[parameter as usize] = enable;
    }

    /// Builder-style variant of [`RenderStates::set_enabled`].
    #[inline]
    pub fn with(mut self, parameter: RendererParameter, enable: bool) -> Self {
        self.set_enabled(parameter, enable);
        self
    }
}

impl Default for RenderStates {
    fn default() -> Self {
        let mut states = Self {
            parameters: [false; RendererParameter::ALL.len()],
            src_blend: BlendFunc::One,
            dst_blend: BlendFunc::Zero,
            face_culling: FaceSide::Back,
            face_filling: FaceFilling::Fill,
            depth_func: CompareFunction::Less,
            stencil: StencilState::default(),
            line_width: 1.0,
            point_size: 1.0,
        };
        states.set_enabled(RendererParameter::ColorWrite, true);
        states.set_enabled(RendererParameter::DepthWrite, true);
        states
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_states() {
        let states = RenderStates::default();
        assert!(states.is_enabled(RendererParameter::ColorWrite));
        assert!(states.is_enabled(RendererParameter::DepthWrite));
        assert!(!states.is_enabled(RendererParameter::Blend));
        assert!(!states.is_enabled(RendererParameter::DepthBuffer));
        assert!(!states.is_enabled(RendererParameter::StencilTest));
        assert_eq!(states.depth_func, CompareFunction::Less);
        assert_eq!(states.stencil.mask, u32::MAX);
        assert_eq!(states.line_width, 1.0);
    }

    #[test]
    fn test_blocks_compare_by_value() {
        let a = RenderStates::default().with(RendererParameter::Blend, true);
        let mut b = RenderStates::default();
        assert_ne!(a, b);
        b.set_enabled(RendererParameter::Blend, true);
        assert_eq!(a, b);
    }
}
