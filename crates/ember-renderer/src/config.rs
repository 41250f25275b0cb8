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

//! Configuration of the renderer.

/// Settings fixed for the lifetime of a [`Renderer`](crate::Renderer).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RendererConfig {
    /// Upper bound on the instance count of instanced draws, and capacity of the
    /// instancing buffer.
    pub max_instances: u32,
    /// Number of attribute slots reserved for texture coordinates, starting at the
    /// `TexCoord` slot. The per-instance matrix occupies the four slots right after.
    pub texture_coordinate_slots: u32,
    /// Rejects software-stored buffers and non-renderable targets.
    pub safety_checks: bool,
}

impl RendererConfig {
    /// Sets [`RendererConfig::max_instances`].
    pub fn with_max_instances(mut self, max_instances: u32) -> Self {
        self.max_instances = max_instances;
        self
    }

    /// Sets [`RendererConfig::texture_coordinate_slots`].
    pub fn with_texture_coordinate_slots(mut self, slots: u32) -> Self {
        self.texture_coordinate_slots = slots;
        self
    }

    /// Sets [`RendererConfig::safety_checks`].
    pub fn with_safety_checks(mut self, enabled: bool) -> Self {
        self.safety_checks = enabled;
        self
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_instances: 8192,
            texture_coordinate_slots: 8,
            safety_checks: true,
        }
    }
}
