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

//! The renderer: cached pipeline state, its setters, and module lifecycle.
//!
//! Setters only touch the cache and raise dirty bits. Outside of draws, the
//! driver is only reached by operations on the output surface (target,
//! viewport, scissor, clear values) and by initialization and teardown.

mod draw;

use crate::capabilities::{Capabilities, RendererCap};
use crate::config::RendererConfig;
use crate::dirty::DirtyFlags;
use crate::instancing::InstancingData;
use crate::matrix_cache::MatrixCache;
use crate::stats::RendererStats;
use crate::texture_units::TextureUnits;
use crate::vertex_arrays::VertexArrayCache;
use ember_core::math::{Color, Mat4, Rect, Vec2};
use ember_core::renderer::{
    BlendFunc, BufferId, BufferKind, BufferUsage, CompareFunction, ContextId, ElementType,
    ElementUsage, FaceFilling, FaceSide, IndexBuffer, MatrixType, ProgramId, RenderDriver,
    RenderError, RenderStates, RenderTarget, RendererParameter, Shader, StencilOperation,
    Texture, TextureSampler, VertexArrayId, VertexBuffer, VertexDeclaration,
};
use std::sync::{Arc, Weak};

/// Clip-space corners of the fullscreen quad, in triangle strip order.
const FULLSCREEN_QUAD: [Vec2; 4] = [
    Vec2::new(-1.0, -1.0),
    Vec2::new(1.0, -1.0),
    Vec2::new(-1.0, 1.0),
    Vec2::new(1.0, 1.0),
];

fn log_rejection(err: &RenderError) {
    log::error!("{err}");
}

/// Everything created by [`Renderer::initialize`] and destroyed by the matching
/// [`Renderer::uninitialize`].
#[derive(Debug)]
struct RendererState {
    capabilities: Capabilities,
    states: RenderStates,
    matrices: MatrixCache,
    texture_units: TextureUnits,
    vertex_arrays: VertexArrayCache,
    dirty: DirtyFlags,
    shader: Option<(ProgramId, Weak<dyn Shader>)>,
    target: Option<Weak<dyn RenderTarget>>,
    vertex_buffer: Option<Weak<VertexBuffer>>,
    index_buffer: Option<Weak<IndexBuffer>>,
    instancing: bool,
    current_vertex_array: Option<(ContextId, VertexArrayId)>,
    instancing_buffer: Option<BufferId>,
    fullscreen_quad: Arc<VertexBuffer>,
}

impl RendererState {
    fn new(
        capabilities: Capabilities,
        instancing_buffer: Option<BufferId>,
        fullscreen_quad: Arc<VertexBuffer>,
    ) -> Self {
        let texture_units = TextureUnits::new(capabilities.max_texture_units());
        Self {
            capabilities,
            states: RenderStates::default(),
            matrices: MatrixCache::new(),
            texture_units,
            vertex_arrays: VertexArrayCache::new(),
            dirty: DirtyFlags::INITIAL,
            shader: None,
            target: None,
            vertex_buffer: None,
            index_buffer: None,
            instancing: false,
            current_vertex_array: None,
            instancing_buffer,
            fullscreen_quad,
        }
    }

    fn live_target(&self) -> Option<Arc<dyn RenderTarget>> {
        self.target.as_ref().and_then(Weak::upgrade)
    }

    fn set_instancing(&mut self, enable: bool) {
        if self.instancing != enable {
            self.instancing = enable;
            self.dirty.insert(DirtyFlags::VERTEX_ARRAY);
        }
    }
}

/// A state cache in front of a [`RenderDriver`].
///
/// The renderer owns its driver. Resources (shaders, textures, buffers, targets)
/// stay owned by the caller: the renderer keeps `Weak` references and reports
/// [`RenderError::ResourceDestroyed`] if one was dropped while still bound.
///
/// Initialization is reference counted: nested [`Renderer::initialize`] /
/// [`Renderer::uninitialize`] pairs are balanced and only the outermost pair does
/// any work. Dropping the renderer tears it down regardless of the count.
///
/// # Example
///
/// ```ignore
/// let mut renderer = Renderer::new(driver, RendererConfig::default());
/// renderer.initialize()?;
/// renderer.set_shader(Some(&shader))?;
/// renderer.set_matrix(MatrixType::Projection, projection)?;
/// renderer.set_vertex_buffer(Some(&mesh))?;
/// renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 36)?;
/// ```
#[derive(Debug)]
pub struct Renderer<D: RenderDriver> {
    driver: D,
    config: RendererConfig,
    ref_count: u32,
    state: Option<RendererState>,
    stats: RendererStats,
}

impl<D: RenderDriver> Renderer<D> {
    /// Wraps `driver`. The renderer is not initialized yet.
    pub fn new(driver: D, config: RendererConfig) -> Self {
        Self {
            driver,
            config,
            ref_count: 0,
            state: None,
            stats: RendererStats::default(),
        }
    }

    // --- Lifecycle ---

    /// Initializes the renderer, or increments the reference count if it already is.
    ///
    /// The first call queries the capability table and creates the fullscreen quad
    /// and, when instancing is supported, the instancing buffer. Failing to create
    /// the instancing buffer only disables instancing; failing to create the quad
    /// rolls everything back.
    ///
    /// ## Errors
    /// * `RenderError::NoActiveContext` - If no context is current.
    /// * `RenderError::Resource` - If the fullscreen quad cannot be created.
    pub fn initialize(&mut self) -> Result<(), RenderError> {
        if self.ref_count > 0 {
            self.ref_count += 1;
            return Ok(());
        }

        self.try_initialize().inspect_err(log_rejection)?;
        self.ref_count = 1;
        log::info!("Renderer initialized");
        Ok(())
    }

    fn try_initialize(&mut self) -> Result<(), RenderError> {
        if self.driver.current_context().is_none() {
            return Err(RenderError::NoActiveContext);
        }

        let mut capabilities = Capabilities::query(&self.driver);

        let instancing_buffer = if capabilities.has(RendererCap::Instancing) {
            let size = u64::from(self.config.max_instances)
                * std::mem::size_of::<InstancingData>() as u64;
            match self
                .driver
                .create_buffer(BufferKind::Vertex, size, BufferUsage::Dynamic)
            {
                Ok(id) => Some(id),
                Err(err) => {
                    log::warn!("Failed to create instancing buffer, instancing disabled: {err}");
                    capabilities.disable(RendererCap::Instancing);
                    None
                }
            }
        } else {
            None
        };

        let fullscreen_quad = match self.create_fullscreen_quad() {
            Ok(quad) => quad,
            Err(err) => {
                if let Some(id) = instancing_buffer {
                    self.driver.destroy_buffer(id);
                }
                return Err(err);
            }
        };

        self.state = Some(RendererState::new(
            capabilities,
            instancing_buffer,
            Arc::new(fullscreen_quad),
        ));
        Ok(())
    }

    fn create_fullscreen_quad(&mut self) -> Result<VertexBuffer, RenderError> {
        let declaration = VertexDeclaration::new(&[(ElementUsage::Position, ElementType::Float2)])?;
        let bytes: &[u8] = bytemuck::cast_slice(&FULLSCREEN_QUAD);

        let id = self
            .driver
            .create_buffer(BufferKind::Vertex, bytes.len() as u64, BufferUsage::Static)?;
        if let Err(err) = self.driver.write_buffer(id, 0, bytes) {
            self.driver.destroy_buffer(id);
            return Err(err.into());
        }

        Ok(VertexBuffer::new(
            id,
            Arc::new(declaration),
            FULLSCREEN_QUAD.len() as u32,
        ))
    }

    /// Decrements the reference count, tearing the renderer down when it reaches zero.
    pub fn uninitialize(&mut self) {
        match self.ref_count {
            0 => log::warn!("Renderer::uninitialize called on an uninitialized renderer"),
            1 => {
                self.ref_count = 0;
                self.teardown();
            }
            _ => self.ref_count -= 1,
        }
    }

    fn teardown(&mut self) {
        let Some(mut state) = self.state.take() else {
            return;
        };

        let context = self.driver.current_context();
        state.vertex_arrays.clear(&mut self.driver, context);
        if let Some(id) = state.instancing_buffer {
            self.driver.destroy_buffer(id);
        }
        self.driver.destroy_buffer(state.fullscreen_quad.buffer);

        log::info!("Renderer uninitialized");
    }

    /// Whether [`Renderer::initialize`] succeeded and was not balanced yet.
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// The wrapped driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The wrapped driver, for resource creation.
    ///
    /// State changed directly through the driver is not tracked: the next draw
    /// only re-asserts the vertex array, texture bindings and render states.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// The configuration the renderer was created with.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Counters since creation or the last [`Renderer::reset_stats`].
    pub fn stats(&self) -> &RendererStats {
        &self.stats
    }

    /// Resets every counter to zero.
    pub fn reset_stats(&mut self) {
        self.stats = RendererStats::default();
    }

    fn state_mut(&mut self) -> Result<&mut RendererState, RenderError> {
        self.state
            .as_mut()
            .ok_or(RenderError::NotInitialized)
            .inspect_err(log_rejection)
    }

    fn with_states(&mut self, f: impl FnOnce(&mut RenderStates)) -> Result<(), RenderError> {
        f(&mut self.state_mut()?.states);
        Ok(())
    }

    // --- Matrices ---

    /// Stores a transform matrix. Derived matrices depending on it become stale.
    pub fn set_matrix(&mut self, kind: MatrixType, matrix: Mat4) -> Result<(), RenderError> {
        let state = self.state_mut()?;
        state.matrices.set(kind, matrix);
        state.dirty.insert(DirtyFlags::MATRICES);
        Ok(())
    }

    /// Returns a transform matrix, recomputing it first if it is stale.
    ///
    /// Identity when the renderer is not initialized.
    pub fn matrix(&mut self, kind: MatrixType) -> Mat4 {
        self.state
            .as_mut()
            .map_or(Mat4::IDENTITY, |state| state.matrices.get(kind))
    }

    // --- Shader ---

    /// Selects the shader used by subsequent draws, or clears it with `None`.
    ///
    /// ## Errors
    /// * `RenderError::ShaderNotCompiled` - If the shader cannot be bound. The
    ///   previous shader stays selected.
    pub fn set_shader(&mut self, shader: Option<&Arc<dyn Shader>>) -> Result<(), RenderError> {
        let state = self.state_mut()?;
        if let Some(shader) = shader {
            if !shader.is_compiled() {
                let err = RenderError::ShaderNotCompiled;
                log_rejection(&err);
                return Err(err);
            }
        }

        let previous = state.shader.as_ref().map(|(program, _)| *program);
        let next = shader.map(|s| s.program());
        if previous != next {
            state.dirty.insert(DirtyFlags::SHADER);
        }
        state.shader = shader.map(|s| (s.program(), Arc::downgrade(s)));
        Ok(())
    }

    /// The selected shader, if it is still alive.
    pub fn shader(&self) -> Option<Arc<dyn Shader>> {
        let (_, shader) = self.state.as_ref()?.shader.as_ref()?;
        shader.upgrade()
    }

    // --- Textures ---

    /// Binds `texture` to `unit`, or clears the unit with `None`.
    ///
    /// Binding the texture a unit already holds schedules nothing.
    ///
    /// ## Errors
    /// * `RenderError::TextureUnitOutOfRange` - If `unit` is not below
    ///   [`Renderer::max_texture_units`].
    pub fn set_texture(
        &mut self,
        unit: u32,
        texture: Option<&Arc<Texture>>,
    ) -> Result<(), RenderError> {
        let state = self.state_mut()?;
        if state
            .texture_units
            .set_texture(unit, texture)
            .inspect_err(log_rejection)?
        {
            state.dirty.insert(DirtyFlags::TEXTURES);
        }
        Ok(())
    }

    /// Replaces the sampler of `unit`.
    ///
    /// ## Errors
    /// * `RenderError::TextureUnitOutOfRange` - If `unit` is not below
    ///   [`Renderer::max_texture_units`].
    pub fn set_texture_sampler(
        &mut self,
        unit: u32,
        sampler: TextureSampler,
    ) -> Result<(), RenderError> {
        let state = self.state_mut()?;
        state
            .texture_units
            .set_sampler(unit, sampler)
            .inspect_err(log_rejection)?;
        state.dirty.insert(DirtyFlags::TEXTURES);
        Ok(())
    }

    /// The texture bound to `unit`, if any and still alive.
    pub fn texture(&self, unit: u32) -> Option<Arc<Texture>> {
        self.state.as_ref()?.texture_units.texture(unit)
    }

    /// The sampler of `unit`.
    pub fn texture_sampler(&self, unit: u32) -> Option<TextureSampler> {
        self.state.as_ref()?.texture_units.sampler(unit)
    }

    // --- Buffers ---

    /// Selects the vertex buffer used by subsequent draws, or clears it with `None`.
    ///
    /// ## Errors
    /// * `RenderError::SoftwareBuffer` - If safety checks are on and the vertices
    ///   are not in video memory.
    pub fn set_vertex_buffer(
        &mut self,
        vertex_buffer: Option<&Arc<VertexBuffer>>,
    ) -> Result<(), RenderError> {
        let safety_checks = self.config.safety_checks;
        let state = self.state_mut()?;
        if let Some(vb) = vertex_buffer {
            if safety_checks && !vb.is_hardware() {
                let err = RenderError::SoftwareBuffer;
                log_rejection(&err);
                return Err(err);
            }
        }

        // The held `Weak` keeps the allocation, so its address cannot be reused.
        let previous = state.vertex_buffer.as_ref().map(Weak::as_ptr);
        if previous != vertex_buffer.map(Arc::as_ptr) {
            state.dirty.insert(DirtyFlags::VERTEX_ARRAY);
        }
        state.vertex_buffer = vertex_buffer.map(Arc::downgrade);
        Ok(())
    }

    /// Selects the index buffer used by indexed draws, or clears it with `None`.
    ///
    /// ## Errors
    /// * `RenderError::SoftwareBuffer` - If safety checks are on and a
    ///   non-sequential buffer is not in video memory.
    pub fn set_index_buffer(
        &mut self,
        index_buffer: Option<&Arc<IndexBuffer>>,
    ) -> Result<(), RenderError> {
        let safety_checks = self.config.safety_checks;
        let state = self.state_mut()?;
        if let Some(ib) = index_buffer {
            if safety_checks && !ib.is_sequential() && !ib.is_hardware() {
                let err = RenderError::SoftwareBuffer;
                log_rejection(&err);
                return Err(err);
            }
        }

        let previous = state
            .index_buffer
            .as_ref()
            .and_then(Weak::upgrade)
            .and_then(|ib| ib.buffer);
        if previous != index_buffer.and_then(|ib| ib.buffer) {
            state.dirty.insert(DirtyFlags::VERTEX_ARRAY);
        }
        state.index_buffer = index_buffer.map(Arc::downgrade);
        Ok(())
    }

    /// Uploads per-instance records for subsequent instanced draws.
    ///
    /// ## Errors
    /// * `RenderError::InstancingUnsupported` - If instancing is unavailable.
    /// * `RenderError::InvalidInstanceCount` - If `data` is empty or larger than
    ///   [`RendererConfig::max_instances`].
    pub fn set_instancing_data(&mut self, data: &[InstancingData]) -> Result<(), RenderError> {
        let max = self.config.max_instances;
        let Self { driver, state, .. } = self;
        let state = state
            .as_ref()
            .ok_or(RenderError::NotInitialized)
            .inspect_err(log_rejection)?;

        let buffer = match state.instancing_buffer {
            Some(buffer) if state.capabilities.has(RendererCap::Instancing) => buffer,
            _ => {
                let err = RenderError::InstancingUnsupported;
                log_rejection(&err);
                return Err(err);
            }
        };
        let count = u32::try_from(data.len()).unwrap_or(u32::MAX);
        if count == 0 || count > max {
            let err = RenderError::InvalidInstanceCount { count, max };
            log_rejection(&err);
            return Err(err);
        }

        driver
            .write_buffer(buffer, 0, bytemuck::cast_slice(data))
            .map_err(RenderError::from)
            .inspect_err(log_rejection)
    }

    /// Evicts every cached vertex array built with `buffer`. Call before destroying
    /// a buffer that was drawn with.
    pub fn forget_buffer(&mut self, buffer: BufferId) {
        let Self { driver, state, .. } = self;
        let Some(state) = state.as_mut() else {
            return;
        };
        let context = driver.current_context();
        if state.vertex_arrays.forget_buffer(buffer, driver, context) > 0 {
            state.current_vertex_array = None;
            state.dirty.insert(DirtyFlags::VERTEX_ARRAY);
        }
    }

    /// Evicts every cached vertex array of a destroyed context, without driver calls.
    pub fn invalidate_context(&mut self, context: ContextId) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.vertex_arrays.invalidate_context(context) > 0 {
            log::debug!("Invalidated vertex arrays of context {context:?}");
            state.current_vertex_array = None;
            state.dirty.insert(DirtyFlags::VERTEX_ARRAY);
        }
    }

    // --- Fixed-function state ---

    /// Replaces the whole render state block.
    pub fn set_render_states(&mut self, states: RenderStates) -> Result<(), RenderError> {
        self.with_states(|s| *s = states)
    }

    /// The render state block applied on the next draw.
    ///
    /// The default block when the renderer is not initialized.
    pub fn render_states(&self) -> RenderStates {
        self.state
            .as_ref()
            .map(|state| state.states)
            .unwrap_or_default()
    }

    /// Enables or disables a pipeline toggle.
    pub fn enable(&mut self, parameter: RendererParameter, enable: bool) -> Result<(), RenderError> {
        self.with_states(|s| s.set_enabled(parameter, enable))
    }

    /// Whether a pipeline toggle is enabled.
    pub fn is_enabled(&self, parameter: RendererParameter) -> bool {
        self.render_states().is_enabled(parameter)
    }

    /// Sets the blend factors.
    pub fn set_blend_func(&mut self, src: BlendFunc, dst: BlendFunc) -> Result<(), RenderError> {
        self.with_states(|s| {
            s.src_blend = src;
            s.dst_blend = dst;
        })
    }

    /// Sets which faces are culled.
    pub fn set_face_culling(&mut self, side: FaceSide) -> Result<(), RenderError> {
        self.with_states(|s| s.face_culling = side)
    }

    /// Sets the polygon rasterization mode.
    pub fn set_face_filling(&mut self, filling: FaceFilling) -> Result<(), RenderError> {
        self.with_states(|s| s.face_filling = filling)
    }

    /// Sets the depth comparison.
    pub fn set_depth_func(&mut self, compare: CompareFunction) -> Result<(), RenderError> {
        self.with_states(|s| s.depth_func = compare)
    }

    /// Sets the line width.
    ///
    /// ## Errors
    /// * `RenderError::InvalidLineWidth` - If `width` is not strictly positive.
    pub fn set_line_width(&mut self, width: f32) -> Result<(), RenderError> {
        if width.is_nan() || width <= 0.0 {
            let err = RenderError::InvalidLineWidth(width);
            log_rejection(&err);
            return Err(err);
        }
        self.with_states(|s| s.line_width = width)
    }

    /// The line width applied on the next draw.
    pub fn line_width(&self) -> f32 {
        self.render_states().line_width
    }

    /// Sets the point size.
    ///
    /// ## Errors
    /// * `RenderError::InvalidPointSize` - If `size` is not strictly positive.
    pub fn set_point_size(&mut self, size: f32) -> Result<(), RenderError> {
        if size.is_nan() || size <= 0.0 {
            let err = RenderError::InvalidPointSize(size);
            log_rejection(&err);
            return Err(err);
        }
        self.with_states(|s| s.point_size = size)
    }

    /// The point size applied on the next draw.
    pub fn point_size(&self) -> f32 {
        self.render_states().point_size
    }

    /// Sets the stencil comparison.
    pub fn set_stencil_compare_function(
        &mut self,
        compare: CompareFunction,
    ) -> Result<(), RenderError> {
        self.with_states(|s| s.stencil.compare = compare)
    }

    /// Sets the operation applied when the stencil test fails.
    pub fn set_stencil_fail_operation(&mut self, op: StencilOperation) -> Result<(), RenderError> {
        self.with_states(|s| s.stencil.fail = op)
    }

    /// Sets the operation applied when both the stencil and depth tests pass.
    pub fn set_stencil_pass_operation(&mut self, op: StencilOperation) -> Result<(), RenderError> {
        self.with_states(|s| s.stencil.pass = op)
    }

    /// Sets the operation applied when the stencil test passes and the depth test fails.
    pub fn set_stencil_z_fail_operation(
        &mut self,
        op: StencilOperation,
    ) -> Result<(), RenderError> {
        self.with_states(|s| s.stencil.depth_fail = op)
    }

    /// Sets the stencil reference value.
    pub fn set_stencil_reference_value(&mut self, reference: u32) -> Result<(), RenderError> {
        self.with_states(|s| s.stencil.reference = reference)
    }

    /// Sets the stencil comparison mask.
    pub fn set_stencil_mask(&mut self, mask: u32) -> Result<(), RenderError> {
        self.with_states(|s| s.stencil.mask = mask)
    }

    // --- Output ---

    /// Makes `target` the destination of subsequent draws, or clears it with `None`.
    ///
    /// Selecting the current target again does nothing. The previous target is
    /// deactivated unless it owns its context. If activation fails, no target is
    /// selected afterwards.
    ///
    /// ## Errors
    /// * `RenderError::TargetNotRenderable` - If safety checks are on and the target
    ///   cannot be drawn to. Nothing changes.
    /// * `RenderError::TargetActivationFailed` - If the target failed to activate.
    pub fn set_target(
        &mut self,
        target: Option<&Arc<dyn RenderTarget>>,
    ) -> Result<(), RenderError> {
        let safety_checks = self.config.safety_checks;
        let Self { driver, state, .. } = self;
        let state = state
            .as_mut()
            .ok_or(RenderError::NotInitialized)
            .inspect_err(log_rejection)?;

        let current = state.live_target();
        let same = match (&current, target) {
            (None, None) => true,
            (Some(a), Some(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            _ => false,
        };
        if same {
            return Ok(());
        }

        if let Some(target) = target {
            if safety_checks && !target.is_renderable() {
                let err = RenderError::TargetNotRenderable;
                log_rejection(&err);
                return Err(err);
            }
        }

        if let Some(previous) = current {
            if !previous.has_context() {
                previous.deactivate(&mut *driver);
            }
        }

        state.target = None;
        if let Some(target) = target {
            if let Err(err) = target.activate(&mut *driver) {
                log::error!("Failed to activate target: {err}");
                return Err(RenderError::TargetActivationFailed);
            }
            state.target = Some(Arc::downgrade(target));
        }
        Ok(())
    }

    /// The selected target, if it is still alive.
    pub fn target(&self) -> Option<Arc<dyn RenderTarget>> {
        self.state.as_ref()?.live_target()
    }

    fn checked_target_rect(&self, rect: Rect) -> Result<Rect, RenderError> {
        let state = self.state.as_ref().ok_or(RenderError::NotInitialized)?;
        if self.driver.current_context().is_none() {
            return Err(RenderError::NoActiveContext);
        }
        let target = state.live_target().ok_or(RenderError::NoTarget)?;
        let (width, height) = (target.width(), target.height());
        if !rect.fits_within(width, height) {
            return Err(RenderError::RectOutOfBounds { width, height });
        }
        Ok(rect.flip_y(height))
    }

    /// Sets the viewport, in top-left origin pixels of the current target.
    ///
    /// ## Errors
    /// * `RenderError::NoTarget` - If no target is selected.
    /// * `RenderError::RectOutOfBounds` - If `rect` exceeds the target.
    pub fn set_viewport(&mut self, rect: Rect) -> Result<(), RenderError> {
        let flipped = self.checked_target_rect(rect).inspect_err(log_rejection)?;
        self.driver.set_viewport(flipped);
        Ok(())
    }

    /// The viewport, read back from the driver, in top-left origin pixels of the
    /// current target.
    pub fn viewport(&self) -> Rect {
        self.from_driver_rect(self.driver.viewport())
    }

    /// Sets the scissor rectangle, in top-left origin pixels of the current target.
    ///
    /// ## Errors
    /// * `RenderError::NoTarget` - If no target is selected.
    /// * `RenderError::RectOutOfBounds` - If `rect` exceeds the target.
    pub fn set_scissor_rect(&mut self, rect: Rect) -> Result<(), RenderError> {
        let flipped = self.checked_target_rect(rect).inspect_err(log_rejection)?;
        self.driver.set_scissor_rect(flipped);
        Ok(())
    }

    /// The scissor rectangle, read back from the driver, in top-left origin pixels
    /// of the current target.
    pub fn scissor_rect(&self) -> Rect {
        self.from_driver_rect(self.driver.scissor_rect())
    }

    fn from_driver_rect(&self, rect: Rect) -> Rect {
        match self.target() {
            Some(target) if rect.fits_within(target.width(), target.height()) => {
                rect.flip_y(target.height())
            }
            _ => rect,
        }
    }

    fn require_context(&mut self) -> Result<(), RenderError> {
        self.state_mut()?;
        if self.driver.current_context().is_none() {
            let err = RenderError::NoActiveContext;
            log_rejection(&err);
            return Err(err);
        }
        Ok(())
    }

    /// Sets the color written by [`Renderer::clear`].
    pub fn set_clear_color(&mut self, color: Color) -> Result<(), RenderError> {
        self.require_context()?;
        self.driver.set_clear_color(color);
        Ok(())
    }

    /// Sets the depth written by [`Renderer::clear`].
    pub fn set_clear_depth(&mut self, depth: f64) -> Result<(), RenderError> {
        self.require_context()?;
        self.driver.set_clear_depth(depth);
        Ok(())
    }

    /// Sets the stencil value written by [`Renderer::clear`].
    pub fn set_clear_stencil(&mut self, value: u32) -> Result<(), RenderError> {
        self.require_context()?;
        self.driver.set_clear_stencil(value);
        Ok(())
    }

    /// Submits every queued driver command.
    pub fn flush(&mut self) -> Result<(), RenderError> {
        self.require_context()?;
        self.driver.flush();
        Ok(())
    }

    // --- Capabilities ---

    /// Whether `cap` is available. `false` when not initialized.
    pub fn has_capability(&self, cap: RendererCap) -> bool {
        self.state
            .as_ref()
            .is_some_and(|state| state.capabilities.has(cap))
    }

    /// The capability table, when initialized.
    pub fn capabilities(&self) -> Option<&Capabilities> {
        self.state.as_ref().map(|state| &state.capabilities)
    }

    /// Number of texture units. `0` when not initialized.
    pub fn max_texture_units(&self) -> u32 {
        self.capabilities()
            .map_or(0, Capabilities::max_texture_units)
    }

    /// Maximum simultaneous render targets. `0` when not initialized.
    pub fn max_render_targets(&self) -> u32 {
        self.capabilities()
            .map_or(0, Capabilities::max_render_targets)
    }

    /// Maximum anisotropy level. `0` when not initialized.
    pub fn max_anisotropy_level(&self) -> u32 {
        self.capabilities()
            .map_or(0, Capabilities::max_anisotropy_level)
    }

    /// Number of vertex arrays currently cached.
    pub fn cached_vertex_arrays(&self) -> usize {
        self.state
            .as_ref()
            .map_or(0, |state| state.vertex_arrays.len())
    }
}

impl<D: RenderDriver> Drop for Renderer<D> {
    fn drop(&mut self) {
        if self.ref_count > 1 {
            log::warn!(
                "Renderer dropped with {} unbalanced initialize calls",
                self.ref_count - 1
            );
        }
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::renderer::mock::{DriverCall, MockTarget, RecordingDriver};
    use ember_core::renderer::{BufferStorage, DriverExtension, ShaderProgram};

    fn initialized() -> Renderer<RecordingDriver> {
        let mut renderer = Renderer::new(RecordingDriver::new(), RendererConfig::default());
        renderer.initialize().unwrap();
        renderer
    }

    #[test]
    fn test_setters_require_initialization() {
        let mut renderer = Renderer::new(RecordingDriver::new(), RendererConfig::default());
        assert!(matches!(
            renderer.set_matrix(MatrixType::World, Mat4::IDENTITY),
            Err(RenderError::NotInitialized)
        ));
        assert!(matches!(
            renderer.set_face_culling(FaceSide::Front),
            Err(RenderError::NotInitialized)
        ));
        assert_eq!(renderer.matrix(MatrixType::WorldViewProj), Mat4::IDENTITY);
        assert_eq!(renderer.max_texture_units(), 0);
    }

    #[test]
    fn test_initialize_creates_quad_and_instancing_buffer() {
        let renderer = initialized();
        assert!(renderer.is_initialized());
        assert_eq!(renderer.driver().count_buffer_creates(), 2);
        assert!(renderer.has_capability(RendererCap::Instancing));

        let quad = renderer.state.as_ref().unwrap().fullscreen_quad.buffer;
        let data = renderer.driver().buffer_data(quad).unwrap();
        assert_eq!(data, bytemuck::cast_slice::<Vec2, u8>(&FULLSCREEN_QUAD));
    }

    #[test]
    fn test_initialize_without_instancing_skips_its_buffer() {
        let driver = RecordingDriver::new().without(DriverExtension::InstancedArrays);
        let mut renderer = Renderer::new(driver, RendererConfig::default());
        renderer.initialize().unwrap();
        assert_eq!(renderer.driver().count_buffer_creates(), 1);
        assert!(!renderer.has_capability(RendererCap::Instancing));
    }

    #[test]
    fn test_initialize_requires_context() {
        let mut driver = RecordingDriver::new();
        driver.set_context(None);
        let mut renderer = Renderer::new(driver, RendererConfig::default());
        assert!(matches!(
            renderer.initialize(),
            Err(RenderError::NoActiveContext)
        ));
        assert!(!renderer.is_initialized());
    }

    #[test]
    fn test_shader_identity_drives_dirty_bit() {
        let mut renderer = initialized();
        let a: Arc<dyn Shader> = Arc::new(ShaderProgram::new(ProgramId(1)));
        let same_program: Arc<dyn Shader> = Arc::new(ShaderProgram::new(ProgramId(1)));

        renderer.set_shader(Some(&a)).unwrap();
        renderer.state.as_mut().unwrap().dirty = DirtyFlags::NONE;

        renderer.set_shader(Some(&same_program)).unwrap();
        assert!(renderer.state.as_ref().unwrap().dirty.is_empty());

        renderer.set_shader(None).unwrap();
        assert!(renderer
            .state
            .as_ref()
            .unwrap()
            .dirty
            .contains(DirtyFlags::SHADER));
    }

    #[test]
    fn test_uncompiled_shader_keeps_previous() {
        let mut renderer = initialized();
        let good: Arc<dyn Shader> = Arc::new(ShaderProgram::new(ProgramId(1)));
        let bad: Arc<dyn Shader> = Arc::new(ShaderProgram::new(ProgramId(2)).not_compiled());

        renderer.set_shader(Some(&good)).unwrap();
        assert!(matches!(
            renderer.set_shader(Some(&bad)),
            Err(RenderError::ShaderNotCompiled)
        ));
        assert_eq!(renderer.shader().unwrap().program(), ProgramId(1));
    }

    #[test]
    fn test_software_vertex_buffer_rejected_with_safety_checks() {
        let mut renderer = initialized();
        let declaration =
            VertexDeclaration::new(&[(ElementUsage::Position, ElementType::Float3)]).unwrap();
        let mut vb = VertexBuffer::new(BufferId(50), Arc::new(declaration), 3);
        vb.storage = BufferStorage::Software;
        let vb = Arc::new(vb);

        assert!(matches!(
            renderer.set_vertex_buffer(Some(&vb)),
            Err(RenderError::SoftwareBuffer)
        ));

        let mut unchecked = Renderer::new(
            RecordingDriver::new(),
            RendererConfig::default().with_safety_checks(false),
        );
        unchecked.initialize().unwrap();
        unchecked.set_vertex_buffer(Some(&vb)).unwrap();
    }

    #[test]
    fn test_vertex_buffer_object_drives_dirty_bit() {
        let mut renderer = initialized();
        let positions =
            VertexDeclaration::new(&[(ElementUsage::Position, ElementType::Float3)]).unwrap();
        let colored = VertexDeclaration::new(&[
            (ElementUsage::Position, ElementType::Float3),
            (ElementUsage::Diffuse, ElementType::Color),
        ])
        .unwrap();
        let a = Arc::new(VertexBuffer::new(BufferId(50), Arc::new(positions), 3));
        let b = Arc::new(VertexBuffer::new(BufferId(50), Arc::new(colored), 3));

        renderer.set_vertex_buffer(Some(&a)).unwrap();
        renderer.state.as_mut().unwrap().dirty = DirtyFlags::NONE;
        renderer.set_vertex_buffer(Some(&a)).unwrap();
        assert!(renderer.state.as_ref().unwrap().dirty.is_empty());

        renderer.set_vertex_buffer(Some(&b)).unwrap();
        assert!(renderer
            .state
            .as_ref()
            .unwrap()
            .dirty
            .contains(DirtyFlags::VERTEX_ARRAY));
    }

    #[test]
    fn test_point_size_rejects_non_positive() {
        let mut renderer = initialized();
        renderer.set_point_size(4.0).unwrap();
        assert!(renderer.set_point_size(0.0).is_err());
        assert!(renderer.set_point_size(f32::NAN).is_err());
        assert_eq!(renderer.point_size(), 4.0);
    }

    #[test]
    fn test_stencil_setters_touch_one_field() {
        let mut renderer = initialized();
        renderer
            .set_stencil_compare_function(CompareFunction::Equal)
            .unwrap();
        renderer
            .set_stencil_pass_operation(StencilOperation::Replace)
            .unwrap();
        renderer.set_stencil_reference_value(3).unwrap();

        let stencil = renderer.render_states().stencil;
        assert_eq!(stencil.compare, CompareFunction::Equal);
        assert_eq!(stencil.pass, StencilOperation::Replace);
        assert_eq!(stencil.fail, StencilOperation::Keep);
        assert_eq!(stencil.reference, 3);
        assert_eq!(stencil.mask, u32::MAX);
        assert_eq!(renderer.driver().count(|c| matches!(c, DriverCall::ApplyStates(_))), 0);
    }

    #[test]
    fn test_viewport_is_flipped_to_bottom_left_origin() {
        let mut renderer = initialized();
        let target: Arc<dyn RenderTarget> = Arc::new(MockTarget::window(ContextId(1), 800, 600));
        renderer.set_target(Some(&target)).unwrap();

        renderer.set_viewport(Rect::new(10, 20, 100, 50)).unwrap();
        assert!(renderer
            .driver()
            .calls()
            .contains(&DriverCall::SetViewport(Rect::new(10, 530, 100, 50))));
        assert_eq!(renderer.viewport(), Rect::new(10, 20, 100, 50));

        assert!(matches!(
            renderer.set_scissor_rect(Rect::new(0, 0, 801, 10)),
            Err(RenderError::RectOutOfBounds {
                width: 800,
                height: 600
            })
        ));
    }

    #[test]
    fn test_teardown_destroys_owned_buffers() {
        let mut renderer = initialized();
        renderer.initialize().unwrap();
        renderer.uninitialize();
        assert!(renderer.is_initialized());

        renderer.uninitialize();
        assert!(!renderer.is_initialized());
        assert_eq!(
            renderer
                .driver()
                .count(|c| matches!(c, DriverCall::DestroyBuffer(_))),
            2
        );
    }
}
