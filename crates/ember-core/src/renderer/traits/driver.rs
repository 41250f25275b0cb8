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

use crate::math::{Color, Mat4, Rect};
use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use std::fmt::Debug;

/// An optional driver feature, queried once when the renderer initializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverExtension {
    /// Anisotropic texture filtering.
    AnisotropicFilter,
    /// Double precision shader arithmetic.
    Fp64,
    /// Framebuffer objects, used by render textures.
    FrameBufferObject,
    /// Pixel buffer objects.
    PixelBufferObject,
    /// Instanced draw calls.
    DrawInstanced,
    /// Per-instance vertex attributes.
    InstancedArrays,
    /// Explicit fragment output binding, required for multiple render targets.
    BindFragDataLocation,
    /// Sampler objects bound independently of textures.
    SamplerObjects,
    /// Vertex array objects.
    VertexArrayObjects,
}

/// Numeric limits reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DriverLimits {
    /// Maximum anisotropy level, meaningful with [`DriverExtension::AnisotropicFilter`].
    pub max_anisotropy: u32,
    /// Maximum number of simultaneous draw buffers.
    pub max_draw_buffers: u32,
    /// Number of texture image units across all shader stages.
    pub max_combined_texture_units: u32,
    /// Number of vertex attribute slots.
    pub max_vertex_attributes: u32,
}

impl Default for DriverLimits {
    fn default() -> Self {
        Self {
            max_anisotropy: 16,
            max_draw_buffers: 8,
            max_combined_texture_units: 32,
            max_vertex_attributes: 16,
        }
    }
}

/// Describes how one vertex attribute slot reads from a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributePointer {
    /// The buffer the attribute reads from.
    pub buffer: BufferId,
    /// Number of components per element.
    pub components: u32,
    /// Storage type of the components.
    pub element_type: ElementType,
    /// Whether integer components are normalized.
    pub normalized: bool,
    /// Distance in bytes between two consecutive elements.
    pub stride: u32,
    /// Offset in bytes of the first element.
    pub offset: u64,
    /// `0` advances per vertex, `n` advances once every `n` instances.
    pub divisor: u32,
}

/// The geometry part of a draw command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawKind {
    /// Non-indexed draw over a vertex range.
    Arrays {
        /// First vertex.
        first: u32,
        /// Number of vertices.
        count: u32,
    },
    /// Indexed draw reading from the bound index buffer.
    Elements {
        /// Width of one index.
        format: IndexFormat,
        /// Offset in bytes of the first index.
        byte_offset: u64,
        /// Number of indices.
        count: u32,
    },
}

/// A fully resolved draw command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawCommand {
    /// Primitive topology.
    pub mode: PrimitiveMode,
    /// Indexed or non-indexed geometry.
    pub kind: DrawKind,
    /// Instance count for instanced draws.
    pub instances: Option<u32>,
}

/// The immediate-mode graphics API driven by the renderer.
///
/// A driver is a global state machine: every `bind_*` and `apply_*` call changes
/// what subsequent draws use. Implementations do not need to filter redundant
/// calls; the renderer only issues what changed, except for
/// [`RenderDriver::apply_states`] which is issued before every draw and is
/// expected to diff against the last applied block itself.
///
/// All methods must be called from the thread that owns the current context.
pub trait RenderDriver: Debug {
    // --- Context and capabilities ---

    /// Returns the context current on the calling thread, if any.
    fn current_context(&self) -> Option<ContextId>;

    /// Makes `context` current on the calling thread, or releases the current one.
    /// ## Errors
    /// * `ResourceError` - If the context cannot be made current.
    fn make_current(&mut self, context: Option<ContextId>) -> Result<(), ResourceError>;

    /// Returns whether an optional feature is available.
    fn is_supported(&self, extension: DriverExtension) -> bool;

    /// Returns the numeric limits of the driver.
    fn limits(&self) -> DriverLimits;

    // --- Buffers ---

    /// Allocates a buffer in video memory.
    /// ## Arguments
    /// * `kind` - The binding point the buffer is meant for.
    /// * `size` - Size in bytes.
    /// * `usage` - Expected update frequency.
    /// ## Returns
    /// The handle of the new buffer.
    /// ## Errors
    /// * `ResourceError` - If the allocation fails.
    fn create_buffer(
        &mut self,
        kind: BufferKind,
        size: u64,
        usage: BufferUsage,
    ) -> Result<BufferId, ResourceError>;

    /// Writes `data` into a buffer at `offset`.
    /// ## Errors
    /// * `ResourceError` - If the handle is invalid or the write is out of bounds.
    fn write_buffer(&mut self, id: BufferId, offset: u64, data: &[u8])
        -> Result<(), ResourceError>;

    /// Releases a buffer.
    fn destroy_buffer(&mut self, id: BufferId);

    /// Binds a buffer to a binding point, or unbinds it with `None`.
    fn bind_buffer(&mut self, kind: BufferKind, id: Option<BufferId>);

    // --- Programs ---

    /// Makes `program` the active shader program.
    fn use_program(&mut self, program: ProgramId);

    /// Uploads a matrix uniform to the active program.
    fn upload_matrix(&mut self, location: UniformLocation, matrix: &Mat4);

    // --- Textures ---

    /// Binds a texture to a texture unit, or unbinds it with `None`.
    fn bind_texture(&mut self, unit: u32, texture: Option<&Texture>);

    /// Binds a sampler object to a texture unit.
    ///
    /// Only called when [`DriverExtension::SamplerObjects`] is supported.
    fn bind_sampler(&mut self, unit: u32, sampler: &TextureSampler);

    /// Writes sampler parameters into the texture bound on `unit`.
    ///
    /// Fallback used when sampler objects are unsupported.
    fn apply_sampler(&mut self, unit: u32, texture: &Texture, sampler: &TextureSampler);

    // --- Vertex arrays ---

    /// Creates a vertex array object in the current context.
    /// ## Errors
    /// * `ResourceError` - If the driver cannot create the object.
    fn create_vertex_array(&mut self) -> Result<VertexArrayId, ResourceError>;

    /// Binds a vertex array object, or unbinds it with `None`.
    fn bind_vertex_array(&mut self, id: Option<VertexArrayId>);

    /// Releases a vertex array object of the current context.
    fn destroy_vertex_array(&mut self, id: VertexArrayId);

    /// Enables an attribute slot and describes where it reads from.
    fn enable_attribute(&mut self, index: u32, pointer: &AttributePointer);

    /// Disables an attribute slot.
    fn disable_attribute(&mut self, index: u32);

    // --- Fixed function and output ---

    /// Applies a fixed-function state block.
    fn apply_states(&mut self, states: &RenderStates);

    /// Sets the viewport, in bottom-left origin pixels.
    fn set_viewport(&mut self, rect: Rect);

    /// Returns the viewport, in bottom-left origin pixels.
    fn viewport(&self) -> Rect;

    /// Sets the scissor rectangle, in bottom-left origin pixels.
    fn set_scissor_rect(&mut self, rect: Rect);

    /// Returns the scissor rectangle, in bottom-left origin pixels.
    fn scissor_rect(&self) -> Rect;

    /// Sets the color written by [`RenderDriver::clear`].
    fn set_clear_color(&mut self, color: Color);

    /// Sets the depth written by [`RenderDriver::clear`].
    fn set_clear_depth(&mut self, depth: f64);

    /// Sets the stencil value written by [`RenderDriver::clear`].
    fn set_clear_stencil(&mut self, value: u32);

    /// Clears buffers of the current target.
    fn clear(&mut self, flags: ClearFlags);

    /// Issues a draw command with the current bindings.
    fn draw(&mut self, command: &DrawCommand);

    /// Submits every queued command to the device.
    fn flush(&mut self);
}
