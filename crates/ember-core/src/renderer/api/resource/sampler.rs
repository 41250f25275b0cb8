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

//! Texture sampling configuration.

/// The filter applied when a texture is minified or magnified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SamplerFilter {
    /// Nearest texel, nearest mip level.
    Nearest,
    /// Linear between texels, nearest mip level.
    #[default]
    Bilinear,
    /// Linear between texels and between mip levels.
    Trilinear,
}

/// How texture coordinates outside `[0, 1]` are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SamplerWrap {
    /// Coordinates are clamped to the edge texel.
    Clamp,
    /// Coordinates wrap around, mirroring every other repetition.
    MirroredRepeat,
    /// Coordinates wrap around.
    #[default]
    Repeat,
}

/// A sampler description attached to a texture unit.
///
/// Besides the user-facing filter, wrap and anisotropy fields, a sampler tracks
/// whether the texture it is applied to has mipmaps. The renderer keeps that flag
/// in sync with the bound texture through [`TextureSampler::use_mipmaps`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextureSampler {
    /// Texel filtering.
    pub filter: SamplerFilter,
    /// Coordinate wrapping on every axis.
    pub wrap: SamplerWrap,
    /// Maximum anisotropy. `1` disables anisotropic filtering.
    pub anisotropy_level: u8,
    mipmaps: bool,
}

impl TextureSampler {
    /// Creates a sampler with the given filter and wrap mode.
    pub const fn new(filter: SamplerFilter, wrap: SamplerWrap) -> Self {
        Self {
            filter,
            wrap,
            anisotropy_level: 1,
            mipmaps: true,
        }
    }

    /// Sets whether mip levels are sampled. Returns `true` if the flag changed.
    pub fn use_mipmaps(&mut self, mipmaps: bool) -> bool {
        let changed = self.mipmaps != mipmaps;
        self.mipmaps = mipmaps;
        changed
    }

    /// Returns whether mip levels are sampled.
    #[inline]
    pub fn uses_mipmaps(&self) -> bool {
        self.mipmaps
    }

    /// The filter a driver should program, downgrading trilinear filtering when
    /// there are no mip levels to blend between.
    pub fn effective_filter(&self) -> SamplerFilter {
        match self.filter {
            SamplerFilter::Trilinear if !self.mipmaps => SamplerFilter::Bilinear,
            filter => filter,
        }
    }
}

impl Default for TextureSampler {
    fn default() -> Self {
        Self::new(SamplerFilter::default(), SamplerWrap::default())
    }
}
