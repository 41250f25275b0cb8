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

//! Draw entry points and the reconciliation pass that precedes every draw.

use super::{log_rejection, Renderer, RendererState, FULLSCREEN_QUAD};
use crate::capabilities::RendererCap;
use crate::config::RendererConfig;
use crate::dirty::DirtyFlags;
use crate::instancing::instance_attribute_base;
use crate::stats::RendererStats;
use crate::vertex_arrays::{describe_attributes, VertexArrayKey};
use ember_core::renderer::{
    ClearFlags, ContextId, DrawCommand, DrawKind, IndexBuffer, PrimitiveMode, RenderDriver,
    RenderError, Shader, VertexBuffer,
};
use std::sync::Arc;

/// Which range of the bound buffers a draw reads.
#[derive(Debug, Clone, Copy)]
enum Geometry {
    Vertices { first: u32, count: u32 },
    Indices { first: u32, count: u32 },
}

/// The live resources a draw was validated against.
struct DrawInputs {
    context: ContextId,
    shader: Arc<dyn Shader>,
    vertex_buffer: Arc<VertexBuffer>,
    index_buffer: Option<Arc<IndexBuffer>>,
}

impl<D: RenderDriver> Renderer<D> {
    /// Clears the buffers selected by `flags` of the current target.
    ///
    /// The render state block is applied first, since write masks and the scissor
    /// test affect clearing. An empty mask does nothing.
    pub fn clear(&mut self, flags: ClearFlags) -> Result<(), RenderError> {
        self.require_context()?;
        if flags.is_empty() {
            return Ok(());
        }
        let Self { driver, state, stats, .. } = self;
        if let Some(state) = state {
            driver.apply_states(&state.states);
        }
        driver.clear(flags);
        stats.clears = stats.clears.saturating_add(1);
        Ok(())
    }

    /// Draws `vertex_count` vertices starting at `first_vertex`.
    ///
    /// ## Errors
    /// * `RenderError::NoShader` / `RenderError::NoVertexBuffer` - If the
    ///   corresponding resource is not bound.
    /// * `RenderError::ResourceDestroyed` - If a bound resource was dropped.
    pub fn draw_primitives(
        &mut self,
        mode: PrimitiveMode,
        first_vertex: u32,
        vertex_count: u32,
    ) -> Result<(), RenderError> {
        let geometry = Geometry::Vertices {
            first: first_vertex,
            count: vertex_count,
        };
        self.submit(mode, geometry, None)
    }

    /// Draws `index_count` indices of the bound index buffer starting at
    /// `first_index`.
    ///
    /// ## Errors
    /// * `RenderError::NoIndexBuffer` - If no index buffer is bound.
    /// * Every error of [`Renderer::draw_primitives`].
    pub fn draw_indexed_primitives(
        &mut self,
        mode: PrimitiveMode,
        first_index: u32,
        index_count: u32,
    ) -> Result<(), RenderError> {
        let geometry = Geometry::Indices {
            first: first_index,
            count: index_count,
        };
        self.submit(mode, geometry, None)
    }

    /// Draws `instance_count` instances of a vertex range, each transformed by the
    /// records of the last [`Renderer::set_instancing_data`].
    ///
    /// ## Errors
    /// * `RenderError::InstancingUnsupported` - If instancing is unavailable.
    /// * `RenderError::InvalidInstanceCount` - If `instance_count` is zero or above
    ///   [`RendererConfig::max_instances`].
    /// * Every error of [`Renderer::draw_primitives`].
    pub fn draw_primitives_instanced(
        &mut self,
        instance_count: u32,
        mode: PrimitiveMode,
        first_vertex: u32,
        vertex_count: u32,
    ) -> Result<(), RenderError> {
        let geometry = Geometry::Vertices {
            first: first_vertex,
            count: vertex_count,
        };
        self.submit(mode, geometry, Some(instance_count))
    }

    /// Indexed counterpart of [`Renderer::draw_primitives_instanced`].
    pub fn draw_indexed_primitives_instanced(
        &mut self,
        instance_count: u32,
        mode: PrimitiveMode,
        first_index: u32,
        index_count: u32,
    ) -> Result<(), RenderError> {
        let geometry = Geometry::Indices {
            first: first_index,
            count: index_count,
        };
        self.submit(mode, geometry, Some(instance_count))
    }

    /// Draws a quad covering the whole target with the current shader.
    ///
    /// Unbinds the index buffer and replaces the vertex buffer.
    pub fn draw_fullscreen_quad(&mut self) -> Result<(), RenderError> {
        self.require_context()?;
        let quad = Arc::clone(&self.state_mut()?.fullscreen_quad);
        self.set_index_buffer(None)?;
        self.set_vertex_buffer(Some(&quad))?;
        self.draw_primitives(PrimitiveMode::TriangleStrip, 0, FULLSCREEN_QUAD.len() as u32)
    }

    fn submit(
        &mut self,
        mode: PrimitiveMode,
        geometry: Geometry,
        instances: Option<u32>,
    ) -> Result<(), RenderError> {
        let Self {
            driver,
            config,
            state,
            stats,
            ..
        } = self;

        let result = state
            .as_mut()
            .ok_or(RenderError::NotInitialized)
            .and_then(|state| {
                let inputs = validate(&*driver, config, state, geometry, instances)?;
                state.set_instancing(instances.is_some());
                reconcile(&mut *driver, config, state, stats, &inputs)?;
                issue(&mut *driver, state, &inputs, mode, geometry, instances);
                Ok(())
            });

        match &result {
            Ok(()) => stats.draw_calls = stats.draw_calls.saturating_add(1),
            Err(err) => {
                stats.rejected_draws = stats.rejected_draws.saturating_add(1);
                log_rejection(err);
            }
        }
        result
    }
}

/// Checks every precondition of a draw without touching any state.
fn validate(
    driver: &dyn RenderDriver,
    config: &RendererConfig,
    state: &RendererState,
    geometry: Geometry,
    instances: Option<u32>,
) -> Result<DrawInputs, RenderError> {
    let context = driver
        .current_context()
        .ok_or(RenderError::NoActiveContext)?;

    let (_, shader) = state.shader.as_ref().ok_or(RenderError::NoShader)?;
    let shader = shader
        .upgrade()
        .ok_or(RenderError::ResourceDestroyed("shader"))?;

    let vertex_buffer = state
        .vertex_buffer
        .as_ref()
        .ok_or(RenderError::NoVertexBuffer)?
        .upgrade()
        .ok_or(RenderError::ResourceDestroyed("vertex buffer"))?;

    let index_buffer = match &state.index_buffer {
        Some(weak) => Some(
            weak.upgrade()
                .ok_or(RenderError::ResourceDestroyed("index buffer"))?,
        ),
        None => None,
    };
    if matches!(geometry, Geometry::Indices { .. }) && index_buffer.is_none() {
        return Err(RenderError::NoIndexBuffer);
    }

    if let Some(count) = instances {
        if !state.capabilities.has(RendererCap::Instancing) {
            return Err(RenderError::InstancingUnsupported);
        }
        let max = config.max_instances;
        if count == 0 || count > max {
            return Err(RenderError::InvalidInstanceCount { count, max });
        }
    }

    Ok(DrawInputs {
        context,
        shader,
        vertex_buffer,
        index_buffer,
    })
}

/// Pushes whatever changed since the previous draw, in dependency order.
fn reconcile(
    driver: &mut dyn RenderDriver,
    config: &RendererConfig,
    state: &mut RendererState,
    stats: &mut RendererStats,
    inputs: &DrawInputs,
) -> Result<(), RenderError> {
    driver.use_program(inputs.shader.program());

    if state.dirty.contains(DirtyFlags::SHADER) {
        state.matrices.rebind(inputs.shader.as_ref());
        state.dirty.remove(DirtyFlags::SHADER);
        state.dirty.insert(DirtyFlags::MATRICES);
    }

    inputs.shader.bind_textures(driver);

    if state.dirty.contains(DirtyFlags::TEXTURES) {
        let sampler_objects = state.capabilities.uses_sampler_objects();
        state.texture_units.reconcile(driver, sampler_objects, stats);
        state.dirty.remove(DirtyFlags::TEXTURES);
    }

    if state.dirty.contains(DirtyFlags::MATRICES) {
        let uploads = state.matrices.upload(driver);
        stats.matrix_uploads = stats.matrix_uploads.saturating_add(u64::from(uploads));
        state.dirty.remove(DirtyFlags::MATRICES);
    }

    let vertex_array_objects = state.capabilities.uses_vertex_array_objects();
    let context_changed = state
        .current_vertex_array
        .is_some_and(|(context, _)| context != inputs.context);
    if state.dirty.contains(DirtyFlags::VERTEX_ARRAY) || context_changed || !vertex_array_objects
    {
        update_vertex_array(driver, config, state, stats, inputs, vertex_array_objects)?;
        state.dirty.remove(DirtyFlags::VERTEX_ARRAY);
    }

    if !state.dirty.is_empty() {
        log::warn!("Dirty flags left after reconciliation: {:?}", state.dirty);
    }
    Ok(())
}

fn update_vertex_array(
    driver: &mut dyn RenderDriver,
    config: &RendererConfig,
    state: &mut RendererState,
    stats: &mut RendererStats,
    inputs: &DrawInputs,
    vertex_array_objects: bool,
) -> Result<(), RenderError> {
    let instancing = state.instancing_buffer.filter(|_| state.instancing);
    let instance_base = instance_attribute_base(config.texture_coordinate_slots);
    let index_buffer = inputs.index_buffer.as_deref();

    if !vertex_array_objects {
        describe_attributes(
            driver,
            &inputs.vertex_buffer,
            index_buffer,
            instancing,
            instance_base,
        );
        state.current_vertex_array = None;
        stats.vertex_array_builds = stats.vertex_array_builds.saturating_add(1);
        return Ok(());
    }

    let key = VertexArrayKey {
        context: inputs.context,
        index_buffer: index_buffer
            .filter(|ib| !ib.is_sequential())
            .and_then(|ib| ib.buffer),
        vertex_buffer: inputs.vertex_buffer.buffer,
        layout: Arc::clone(&inputs.vertex_buffer.declaration),
        instancing: state.instancing,
    };

    if let Some(id) = state.vertex_arrays.get(&key) {
        state.current_vertex_array = Some((inputs.context, id));
        stats.vertex_array_hits = stats.vertex_array_hits.saturating_add(1);
        return Ok(());
    }

    let id = driver.create_vertex_array()?;
    driver.bind_vertex_array(Some(id));
    describe_attributes(
        driver,
        &inputs.vertex_buffer,
        index_buffer,
        instancing,
        instance_base,
    );
    driver.bind_vertex_array(None);

    log::debug!("Built vertex array {id:?} for {key:?}");
    state.vertex_arrays.insert(key, id);
    state.current_vertex_array = Some((inputs.context, id));
    stats.vertex_array_builds = stats.vertex_array_builds.saturating_add(1);
    Ok(())
}

/// Re-asserts the bindings other driver users may have changed, then draws.
fn issue(
    driver: &mut dyn RenderDriver,
    state: &RendererState,
    inputs: &DrawInputs,
    mode: PrimitiveMode,
    geometry: Geometry,
    instances: Option<u32>,
) {
    let vertex_array_objects = state.capabilities.uses_vertex_array_objects();
    if vertex_array_objects {
        driver.bind_vertex_array(state.current_vertex_array.map(|(_, id)| id));
    }
    state.texture_units.rebind_all(driver);
    driver.apply_states(&state.states);

    let kind = match (geometry, inputs.index_buffer.as_deref()) {
        (Geometry::Indices { first, count }, Some(ib)) if !ib.is_sequential() => {
            DrawKind::Elements {
                format: ib.format,
                byte_offset: u64::from(first) * ib.format.size(),
                count,
            }
        }
        (Geometry::Indices { first, count }, Some(ib)) => DrawKind::Arrays {
            first: ib.start_index + first,
            count,
        },
        (Geometry::Indices { first, count }, None) | (Geometry::Vertices { first, count }, _) => {
            DrawKind::Arrays { first, count }
        }
    };
    driver.draw(&DrawCommand {
        mode,
        kind,
        instances,
    });

    if vertex_array_objects {
        driver.bind_vertex_array(None);
    }
}
