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

//! # Ember Renderer
//!
//! A state cache sitting directly above a [`RenderDriver`](ember_core::renderer::RenderDriver).
//!
//! Callers mutate pipeline state (matrices, shader, texture units, buffers, fixed-function
//! toggles) through cheap setters that only update the cache and raise coarse dirty bits.
//! Each draw call then runs a single reconciliation pass that pushes to the driver only
//! what changed since the previous draw, in a fixed order, before issuing the geometry
//! command.

#![warn(missing_docs)]

pub mod capabilities;
pub mod config;
mod dirty;
pub mod instancing;
pub mod matrix_cache;
mod renderer;
pub mod stats;
pub mod texture_units;
pub mod vertex_arrays;

pub use capabilities::{Capabilities, RendererCap};
pub use config::RendererConfig;
pub use instancing::InstancingData;
pub use renderer::Renderer;
pub use stats::RendererStats;
