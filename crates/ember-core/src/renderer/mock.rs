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

//! An in-memory [`RenderDriver`] that records every call.
//!
//! Enabled by the `mock` feature. Tests drive the renderer against a
//! [`RecordingDriver`], then assert on the recorded [`DriverCall`] list.

use super::api::*;
use super::error::{RenderError, ResourceError};
use super::traits::*;
use crate::math::{Color, Mat4, Rect};
use std::cell::Cell;
use std::collections::{HashMap, HashSet};

/// Records a driver call for verification in tests.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    MakeCurrent(Option<ContextId>),
    CreateBuffer {
        id: BufferId,
        kind: BufferKind,
        size: u64,
        usage: BufferUsage,
    },
    WriteBuffer {
        id: BufferId,
        offset: u64,
        size: usize,
    },
    DestroyBuffer(BufferId),
    BindBuffer(BufferKind, Option<BufferId>),
    UseProgram(ProgramId),
    UploadMatrix(UniformLocation, Mat4),
    BindTexture(u32, Option<TextureId>),
    BindSampler(u32, TextureSampler),
    ApplySampler(u32, TextureId, TextureSampler),
    CreateVertexArray(VertexArrayId),
    BindVertexArray(Option<VertexArrayId>),
    DestroyVertexArray(VertexArrayId),
    EnableAttribute(u32, AttributePointer),
    DisableAttribute(u32),
    ApplyStates(RenderStates),
    SetViewport(Rect),
    SetScissorRect(Rect),
    SetClearColor(Color),
    SetClearDepth(f64),
    SetClearStencil(u32),
    Clear(ClearFlags),
    Draw(DrawCommand),
    Flush,
}

/// A driver that keeps no GPU state beyond what tests need to inspect.
///
/// # Example
///
/// ```rust
/// use ember_core::renderer::mock::RecordingDriver;
/// use ember_core::renderer::{BufferKind, BufferUsage, RenderDriver};
///
/// let mut driver = RecordingDriver::new();
/// let id = driver.create_buffer(BufferKind::Vertex, 64, BufferUsage::Static).unwrap();
/// driver.write_buffer(id, 0, &[0u8; 64]).unwrap();
/// assert!(driver.write_buffer(id, 32, &[0u8; 64]).is_err());
/// assert_eq!(driver.count_buffer_creates(), 1);
/// ```
#[derive(Debug)]
pub struct RecordingDriver {
    calls: Vec<DriverCall>,
    context: Option<ContextId>,
    extensions: HashSet<DriverExtension>,
    limits: DriverLimits,
    buffers: HashMap<BufferId, Vec<u8>>,
    vertex_arrays: HashSet<VertexArrayId>,
    viewport: Rect,
    scissor: Rect,
    next_id: usize,
    fail_buffer_usage: Option<BufferUsage>,
    fail_vertex_array_creation: bool,
}

impl RecordingDriver {
    /// Every extension supported, default limits, and context `ContextId(1)` current.
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            context: Some(ContextId(1)),
            extensions: [
                DriverExtension::AnisotropicFilter,
                DriverExtension::Fp64,
                DriverExtension::FrameBufferObject,
                DriverExtension::PixelBufferObject,
                DriverExtension::DrawInstanced,
                DriverExtension::InstancedArrays,
                DriverExtension::BindFragDataLocation,
                DriverExtension::SamplerObjects,
                DriverExtension::VertexArrayObjects,
            ]
            .into_iter()
            .collect(),
            limits: DriverLimits::default(),
            buffers: HashMap::new(),
            vertex_arrays: HashSet::new(),
            viewport: Rect::default(),
            scissor: Rect::default(),
            next_id: 1,
            fail_buffer_usage: None,
            fail_vertex_array_creation: false,
        }
    }

    /// Removes an extension from the supported set.
    pub fn without(mut self, extension: DriverExtension) -> Self {
        self.extensions.remove(&extension);
        self
    }

    /// Replaces the reported limits.
    pub fn with_limits(mut self, limits: DriverLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the current context without recording a call.
    pub fn set_context(&mut self, context: Option<ContextId>) {
        self.context = context;
    }

    /// Makes every subsequent creation of a buffer with `usage` fail. `None`
    /// restores normal behavior.
    pub fn fail_buffer_creation(&mut self, usage: Option<BufferUsage>) {
        self.fail_buffer_usage = usage;
    }

    /// Makes every subsequent vertex array creation fail.
    pub fn fail_vertex_array_creation(&mut self, fail: bool) {
        self.fail_vertex_array_creation = fail;
    }

    /// All recorded calls, oldest first.
    pub fn calls(&self) -> &[DriverCall] {
        &self.calls
    }

    /// Forgets the recorded calls. Resource state is kept.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Counts the recorded calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&DriverCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    /// Counts buffer creations.
    pub fn count_buffer_creates(&self) -> usize {
        self.count(|c| matches!(c, DriverCall::CreateBuffer { .. }))
    }

    /// Counts vertex array creations.
    pub fn count_vertex_array_creates(&self) -> usize {
        self.count(|c| matches!(c, DriverCall::CreateVertexArray(_)))
    }

    /// Counts attribute descriptions (enabled slots).
    pub fn count_attribute_enables(&self) -> usize {
        self.count(|c| matches!(c, DriverCall::EnableAttribute(..)))
    }

    /// Counts matrix uploads.
    pub fn count_matrix_uploads(&self) -> usize {
        self.count(|c| matches!(c, DriverCall::UploadMatrix(..)))
    }

    /// Counts draw commands.
    pub fn count_draws(&self) -> usize {
        self.count(|c| matches!(c, DriverCall::Draw(_)))
    }

    /// The matrices uploaded to `location`, oldest first.
    pub fn uploads_to(&self, location: UniformLocation) -> Vec<Mat4> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DriverCall::UploadMatrix(loc, m) if *loc == location => Some(*m),
                _ => None,
            })
            .collect()
    }

    /// The last draw command issued.
    pub fn last_draw(&self) -> Option<DrawCommand> {
        self.calls.iter().rev().find_map(|c| match c {
            DriverCall::Draw(command) => Some(*command),
            _ => None,
        })
    }

    /// The last state block applied.
    pub fn last_states(&self) -> Option<RenderStates> {
        self.calls.iter().rev().find_map(|c| match c {
            DriverCall::ApplyStates(states) => Some(*states),
            _ => None,
        })
    }

    /// The current contents of a buffer.
    pub fn buffer_data(&self, id: BufferId) -> Option<&[u8]> {
        self.buffers.get(&id).map(Vec::as_slice)
    }

    /// Whether a buffer is alive.
    pub fn has_buffer(&self, id: BufferId) -> bool {
        self.buffers.contains_key(&id)
    }

    /// Number of vertex arrays alive.
    pub fn live_vertex_arrays(&self) -> usize {
        self.vertex_arrays.len()
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for RecordingDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderDriver for RecordingDriver {
    fn current_context(&self) -> Option<ContextId> {
        self.context
    }

    fn make_current(&mut self, context: Option<ContextId>) -> Result<(), ResourceError> {
        self.calls.push(DriverCall::MakeCurrent(context));
        self.context = context;
        Ok(())
    }

    fn is_supported(&self, extension: DriverExtension) -> bool {
        self.extensions.contains(&extension)
    }

    fn limits(&self) -> DriverLimits {
        self.limits
    }

    fn create_buffer(
        &mut self,
        kind: BufferKind,
        size: u64,
        usage: BufferUsage,
    ) -> Result<BufferId, ResourceError> {
        if self.fail_buffer_usage == Some(usage) {
            return Err(ResourceError::CreationFailed {
                what: format!("{usage:?} {kind:?} buffer"),
                details: "injected failure".to_string(),
            });
        }
        let id = BufferId(self.next_id());
        let len = usize::try_from(size)
            .map_err(|_| ResourceError::BackendError(format!("size {size} too large")))?;
        self.buffers.insert(id, vec![0; len]);
        self.calls.push(DriverCall::CreateBuffer {
            id,
            kind,
            size,
            usage,
        });
        Ok(id)
    }

    fn write_buffer(
        &mut self,
        id: BufferId,
        offset: u64,
        data: &[u8],
    ) -> Result<(), ResourceError> {
        let storage = self
            .buffers
            .get_mut(&id)
            .ok_or(ResourceError::InvalidHandle)?;
        let start = offset as usize;
        let end = start + data.len();
        if end > storage.len() {
            return Err(ResourceError::OutOfBounds {
                buffer: id,
                offset,
                size: data.len() as u64,
            });
        }
        storage[start..end].copy_from_slice(data);
        self.calls.push(DriverCall::WriteBuffer {
            id,
            offset,
            size: data.len(),
        });
        Ok(())
    }

    fn destroy_buffer(&mut self, id: BufferId) {
        self.buffers.remove(&id);
        self.calls.push(DriverCall::DestroyBuffer(id));
    }

    fn bind_buffer(&mut self, kind: BufferKind, id: Option<BufferId>) {
        self.calls.push(DriverCall::BindBuffer(kind, id));
    }

    fn use_program(&mut self, program: ProgramId) {
        self.calls.push(DriverCall::UseProgram(program));
    }

    fn upload_matrix(&mut self, location: UniformLocation, matrix: &Mat4) {
        self.calls.push(DriverCall::UploadMatrix(location, *matrix));
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<&Texture>) {
        self.calls
            .push(DriverCall::BindTexture(unit, texture.map(|t| t.id)));
    }

    fn bind_sampler(&mut self, unit: u32, sampler: &TextureSampler) {
        self.calls.push(DriverCall::BindSampler(unit, *sampler));
    }

    fn apply_sampler(&mut self, unit: u32, texture: &Texture, sampler: &TextureSampler) {
        self.calls
            .push(DriverCall::ApplySampler(unit, texture.id, *sampler));
    }

    fn create_vertex_array(&mut self) -> Result<VertexArrayId, ResourceError> {
        if self.fail_vertex_array_creation {
            return Err(ResourceError::CreationFailed {
                what: "vertex array".to_string(),
                details: "injected failure".to_string(),
            });
        }
        let id = VertexArrayId(self.next_id());
        self.vertex_arrays.insert(id);
        self.calls.push(DriverCall::CreateVertexArray(id));
        Ok(id)
    }

    fn bind_vertex_array(&mut self, id: Option<VertexArrayId>) {
        self.calls.push(DriverCall::BindVertexArray(id));
    }

    fn destroy_vertex_array(&mut self, id: VertexArrayId) {
        self.vertex_arrays.remove(&id);
        self.calls.push(DriverCall::DestroyVertexArray(id));
    }

    fn enable_attribute(&mut self, index: u32, pointer: &AttributePointer) {
        self.calls.push(DriverCall::EnableAttribute(index, *pointer));
    }

    fn disable_attribute(&mut self, index: u32) {
        self.calls.push(DriverCall::DisableAttribute(index));
    }

    fn apply_states(&mut self, states: &RenderStates) {
        self.calls.push(DriverCall::ApplyStates(*states));
    }

    fn set_viewport(&mut self, rect: Rect) {
        self.viewport = rect;
        self.calls.push(DriverCall::SetViewport(rect));
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn set_scissor_rect(&mut self, rect: Rect) {
        self.scissor = rect;
        self.calls.push(DriverCall::SetScissorRect(rect));
    }

    fn scissor_rect(&self) -> Rect {
        self.scissor
    }

    fn set_clear_color(&mut self, color: Color) {
        self.calls.push(DriverCall::SetClearColor(color));
    }

    fn set_clear_depth(&mut self, depth: f64) {
        self.calls.push(DriverCall::SetClearDepth(depth));
    }

    fn set_clear_stencil(&mut self, value: u32) {
        self.calls.push(DriverCall::SetClearStencil(value));
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.calls.push(DriverCall::Clear(flags));
    }

    fn draw(&mut self, command: &DrawCommand) {
        self.calls.push(DriverCall::Draw(*command));
    }

    fn flush(&mut self) {
        self.calls.push(DriverCall::Flush);
    }
}

/// A render target backed by a [`RecordingDriver`] context.
#[derive(Debug)]
pub struct MockTarget {
    context: ContextId,
    width: u32,
    height: u32,
    owns_context: bool,
    renderable: bool,
    fail_activation: bool,
    deactivations: Cell<u32>,
}

impl MockTarget {
    /// A renderable window-like target owning `context`.
    pub fn window(context: ContextId, width: u32, height: u32) -> Self {
        Self {
            context,
            width,
            height,
            owns_context: true,
            renderable: true,
            fail_activation: false,
            deactivations: Cell::new(0),
        }
    }

    /// A renderable offscreen target drawing through `context`.
    pub fn offscreen(context: ContextId, width: u32, height: u32) -> Self {
        Self {
            owns_context: false,
            ..Self::window(context, width, height)
        }
    }

    /// Marks the target as not renderable.
    pub fn not_renderable(mut self) -> Self {
        self.renderable = false;
        self
    }

    /// Makes activation fail.
    pub fn failing_activation(mut self) -> Self {
        self.fail_activation = true;
        self
    }

    /// Number of times the target was deactivated.
    pub fn deactivations(&self) -> u32 {
        self.deactivations.get()
    }
}

impl RenderTarget for MockTarget {
    fn is_renderable(&self) -> bool {
        self.renderable
    }

    fn has_context(&self) -> bool {
        self.owns_context
    }

    fn activate(&self, driver: &mut dyn RenderDriver) -> Result<(), RenderError> {
        if self.fail_activation {
            return Err(RenderError::TargetActivationFailed);
        }
        driver.make_current(Some(self.context))?;
        Ok(())
    }

    fn deactivate(&self, _driver: &mut dyn RenderDriver) {
        self.deactivations.set(self.deactivations.get() + 1);
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}
