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

//! Counters describing the work the renderer pushed to the driver.

/// Cumulative counters since the last [`Renderer::reset_stats`](crate::Renderer::reset_stats).
///
/// Counters saturate instead of wrapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RendererStats {
    /// Geometry commands issued.
    pub draw_calls: u64,
    /// Clear commands issued.
    pub clears: u64,
    /// Draws rejected by a precondition.
    pub rejected_draws: u64,
    /// Vertex attribute layouts described, either into a new vertex array or directly.
    pub vertex_array_builds: u64,
    /// Draws that reused a cached vertex array.
    pub vertex_array_hits: u64,
    /// Matrix uniforms uploaded.
    pub matrix_uploads: u64,
    /// Texture binds issued during reconciliation.
    pub texture_binds: u64,
    /// Sampler binds or parameter applications issued during reconciliation.
    pub sampler_binds: u64,
}
