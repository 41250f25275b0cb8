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

//! The capability table, built once from driver queries at initialization.

use ember_core::renderer::{DriverExtension, ElementUsage, RenderDriver};

/// A renderer-level feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererCap {
    /// Anisotropic texture filtering.
    AnisotropicFilter,
    /// Double precision shader arithmetic.
    Fp64,
    /// Buffers stored in video memory.
    HardwareBuffer,
    /// Instanced draws with per-instance world matrices.
    Instancing,
    /// Drawing into several color targets at once.
    MultipleRenderTargets,
    /// Occlusion queries.
    OcclusionQuery,
    /// Pixel buffer objects.
    PixelBufferObject,
    /// Offscreen render targets.
    RenderTexture,
    /// Three-dimensional textures.
    Texture3D,
    /// Cubemap textures.
    TextureCubemap,
    /// More than one texture unit.
    TextureMulti,
    /// Non power-of-two texture sizes.
    TextureNpot,
}

impl RendererCap {
    /// Number of capabilities.
    pub const COUNT: usize = 12;

    /// Every capability, in declaration order.
    pub const ALL: [RendererCap; Self::COUNT] = [
        RendererCap::AnisotropicFilter,
        RendererCap::Fp64,
        RendererCap::HardwareBuffer,
        RendererCap::Instancing,
        RendererCap::MultipleRenderTargets,
        RendererCap::OcclusionQuery,
        RendererCap::PixelBufferObject,
        RendererCap::RenderTexture,
        RendererCap::Texture3D,
        RendererCap::TextureCubemap,
        RendererCap::TextureMulti,
        RendererCap::TextureNpot,
    ];
}

/// Feature flags and numeric limits of the driver, read-only after initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    supported: [bool; RendererCap::COUNT],
    max_anisotropy_level: u32,
    max_render_targets: u32,
    max_texture_units: u32,
    sampler_objects: bool,
    vertex_array_objects: bool,
}

impl Capabilities {
    /// Builds the table from the driver's extensions and limits.
    pub fn query(driver: &dyn RenderDriver) -> Self {
        let has = |ext| driver.is_supported(ext);
        let limits = driver.limits();

        let mut supported = [false; RendererCap::COUNT];
        for cap in RendererCap::ALL {
            supported[cap as usize] = match cap {
                RendererCap::AnisotropicFilter => has(DriverExtension::AnisotropicFilter),
                RendererCap::Fp64 => has(DriverExtension::Fp64),
                RendererCap::Instancing => {
                    has(DriverExtension::DrawInstanced) && has(DriverExtension::InstancedArrays)
                }
                RendererCap::MultipleRenderTargets => has(DriverExtension::BindFragDataLocation),
                RendererCap::PixelBufferObject => has(DriverExtension::PixelBufferObject),
                RendererCap::RenderTexture => has(DriverExtension::FrameBufferObject),
                RendererCap::HardwareBuffer
                | RendererCap::OcclusionQuery
                | RendererCap::Texture3D
                | RendererCap::TextureCubemap
                | RendererCap::TextureMulti
                | RendererCap::TextureNpot => true,
            };
        }

        let max_anisotropy_level = if supported[RendererCap::AnisotropicFilter as usize] {
            limits.max_anisotropy.max(1)
        } else {
            1
        };

        let max_render_targets = if supported[RendererCap::MultipleRenderTargets as usize] {
            limits.max_draw_buffers.max(1)
        } else {
            1
        };

        // Texture coordinate attributes bound the usable units as much as the samplers do.
        let coordinate_slots = limits
            .max_vertex_attributes
            .saturating_sub(ElementUsage::TexCoord.attribute_index());
        let max_texture_units = limits.max_combined_texture_units.min(coordinate_slots);

        let caps = Self {
            supported,
            max_anisotropy_level,
            max_render_targets,
            max_texture_units,
            sampler_objects: has(DriverExtension::SamplerObjects),
            vertex_array_objects: has(DriverExtension::VertexArrayObjects),
        };

        log::info!(
            "Renderer capabilities: {} texture units, {} render targets, anisotropy x{}, instancing {}",
            caps.max_texture_units,
            caps.max_render_targets,
            caps.max_anisotropy_level,
            caps.has(RendererCap::Instancing)
        );
        if !caps.vertex_array_objects {
            log::warn!("Vertex array objects are unsupported, attributes will be described on every draw");
        }

        caps
    }

    /// Returns whether `cap` is available.
    #[inline]
    pub fn has(&self, cap: RendererCap) -> bool {
        self.supported[cap as usize]
    }

    /// Maximum anisotropy level, `1` without anisotropic filtering.
    #[inline]
    pub fn max_anisotropy_level(&self) -> u32 {
        self.max_anisotropy_level
    }

    /// Maximum number of simultaneous color targets, `1` without MRT support.
    #[inline]
    pub fn max_render_targets(&self) -> u32 {
        self.max_render_targets
    }

    /// Number of texture units the renderer tracks.
    #[inline]
    pub fn max_texture_units(&self) -> u32 {
        self.max_texture_units
    }

    /// Whether samplers are bound as independent objects.
    #[inline]
    pub fn uses_sampler_objects(&self) -> bool {
        self.sampler_objects
    }

    /// Whether attribute layouts are cached in vertex array objects.
    #[inline]
    pub fn uses_vertex_array_objects(&self) -> bool {
        self.vertex_array_objects
    }

    pub(crate) fn disable(&mut self, cap: RendererCap) {
        self.supported[cap as usize] = false;
    }
}
