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

mod common;

use anyhow::Result;
use approx::assert_abs_diff_eq;
use common::{projection, quad_mesh, renderer, renderer_with, wvp_shader};
use ember_core::math::{Mat4, Vec3};
use ember_core::renderer::mock::{DriverCall, RecordingDriver};
use ember_core::renderer::{
    BufferId, ContextId, DrawKind, ElementType, ElementUsage, IndexBuffer, IndexFormat,
    MatrixType, PrimitiveMode, RenderError, RenderStates, UniformLocation, VertexBuffer,
    VertexDeclaration,
};
use ember_renderer::{InstancingData, RendererConfig};
use std::sync::Arc;

#[test]
fn test_first_draw_builds_one_vertex_array_and_uploads_inputs_once() -> Result<()> {
    let mut renderer = renderer();
    let shader = wvp_shader(1);
    let mesh = quad_mesh(100);

    renderer.set_shader(Some(&shader))?;
    renderer.set_matrix(MatrixType::World, Mat4::IDENTITY)?;
    renderer.set_matrix(MatrixType::View, Mat4::IDENTITY)?;
    renderer.set_matrix(MatrixType::Projection, projection())?;
    renderer.set_vertex_buffer(Some(&mesh))?;
    renderer.draw_primitives(PrimitiveMode::TriangleStrip, 0, 4)?;

    let driver = renderer.driver();
    assert_eq!(driver.count_vertex_array_creates(), 1);
    assert_eq!(driver.count_matrix_uploads(), 3);
    assert_eq!(driver.uploads_to(UniformLocation(0)), vec![Mat4::IDENTITY]);
    assert_eq!(driver.uploads_to(UniformLocation(1)), vec![Mat4::IDENTITY]);
    assert_eq!(driver.uploads_to(UniformLocation(2)), vec![projection()]);
    assert_eq!(driver.last_states(), Some(RenderStates::default()));
    assert_eq!(
        driver.last_draw().map(|d| d.kind),
        Some(DrawKind::Arrays { first: 0, count: 4 })
    );
    assert_eq!(renderer.stats().draw_calls, 1);
    assert_eq!(renderer.stats().matrix_uploads, 3);
    Ok(())
}

#[test]
fn test_second_identical_draw_reuses_everything() -> Result<()> {
    let mut renderer = renderer();
    let (shader, mesh) = (wvp_shader(1), quad_mesh(100));
    renderer.set_shader(Some(&shader))?;
    renderer.set_vertex_buffer(Some(&mesh))?;

    renderer.draw_primitives(PrimitiveMode::TriangleStrip, 0, 4)?;
    renderer.draw_primitives(PrimitiveMode::TriangleStrip, 0, 4)?;

    assert_eq!(renderer.driver().count_vertex_array_creates(), 1);
    assert_eq!(renderer.driver().count_attribute_enables(), 2);
    assert_eq!(renderer.driver().count_matrix_uploads(), 3);
    assert_eq!(renderer.stats().vertex_array_builds, 1);
    assert_eq!(renderer.driver().count_draws(), 2);
    Ok(())
}

#[test]
fn test_each_key_component_triggers_exactly_one_build() -> Result<()> {
    let mut renderer = renderer();
    let shader = wvp_shader(1);
    let (mesh_a, mesh_b) = (quad_mesh(100), quad_mesh(101));
    let indices = Arc::new(IndexBuffer::new(BufferId(200), IndexFormat::U16, 6));
    renderer.set_shader(Some(&shader))?;
    renderer.set_vertex_buffer(Some(&mesh_a))?;
    renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 3)?;
    assert_eq!(renderer.driver().count_vertex_array_creates(), 1);

    // Vertex buffer.
    renderer.set_vertex_buffer(Some(&mesh_b))?;
    renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 3)?;
    renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 3)?;
    assert_eq!(renderer.driver().count_vertex_array_creates(), 2);

    // Index buffer.
    renderer.set_index_buffer(Some(&indices))?;
    renderer.draw_indexed_primitives(PrimitiveMode::TriangleList, 0, 6)?;
    renderer.draw_indexed_primitives(PrimitiveMode::TriangleList, 0, 6)?;
    assert_eq!(renderer.driver().count_vertex_array_creates(), 3);

    // Instancing.
    renderer.set_instancing_data(&[InstancingData::default(); 2])?;
    renderer.draw_indexed_primitives_instanced(2, PrimitiveMode::TriangleList, 0, 6)?;
    renderer.draw_indexed_primitives_instanced(2, PrimitiveMode::TriangleList, 0, 6)?;
    assert_eq!(renderer.driver().count_vertex_array_creates(), 4);

    // Context.
    renderer.driver_mut().set_context(Some(ContextId(2)));
    renderer.draw_indexed_primitives_instanced(2, PrimitiveMode::TriangleList, 0, 6)?;
    renderer.draw_indexed_primitives_instanced(2, PrimitiveMode::TriangleList, 0, 6)?;
    assert_eq!(renderer.driver().count_vertex_array_creates(), 5);

    // Back to a known combination.
    renderer.driver_mut().set_context(Some(ContextId(1)));
    renderer.set_index_buffer(None)?;
    renderer.set_vertex_buffer(Some(&mesh_a))?;
    renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 3)?;
    assert_eq!(renderer.driver().count_vertex_array_creates(), 5);
    assert_eq!(renderer.cached_vertex_arrays(), 5);
    Ok(())
}

#[test]
fn test_layout_change_over_same_storage_rebuilds() -> Result<()> {
    let mut renderer = renderer();
    let shader = wvp_shader(1);
    let positions = VertexDeclaration::new(&[(ElementUsage::Position, ElementType::Float3)])?;
    let positions_only = Arc::new(VertexBuffer::new(BufferId(100), Arc::new(positions), 4));
    let textured = quad_mesh(100);
    renderer.set_shader(Some(&shader))?;

    renderer.set_vertex_buffer(Some(&positions_only))?;
    renderer.draw_primitives(PrimitiveMode::TriangleStrip, 0, 4)?;
    renderer.set_vertex_buffer(Some(&textured))?;
    renderer.draw_primitives(PrimitiveMode::TriangleStrip, 0, 4)?;

    assert_eq!(renderer.driver().count_vertex_array_creates(), 2);
    assert_eq!(renderer.driver().count_attribute_enables(), 3);
    assert_eq!(renderer.stats().vertex_array_builds, 2);

    // Both layouts stay cached.
    renderer.set_vertex_buffer(Some(&positions_only))?;
    renderer.draw_primitives(PrimitiveMode::TriangleStrip, 0, 4)?;
    assert_eq!(renderer.driver().count_vertex_array_creates(), 2);
    assert_eq!(renderer.stats().vertex_array_hits, 1);
    Ok(())
}

#[test]
fn test_shader_swap_reuploads_declared_matrices() -> Result<()> {
    let mut renderer = renderer();
    let (first, second) = (wvp_shader(1), wvp_shader(2));
    let mesh = quad_mesh(100);
    renderer.set_shader(Some(&first))?;
    renderer.set_vertex_buffer(Some(&mesh))?;
    renderer.set_matrix(MatrixType::Projection, projection())?;
    renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 3)?;
    assert_eq!(renderer.driver().count_matrix_uploads(), 3);

    renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 3)?;
    assert_eq!(renderer.driver().count_matrix_uploads(), 3);

    renderer.set_shader(Some(&second))?;
    renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 3)?;
    assert_eq!(renderer.driver().count_matrix_uploads(), 6);
    assert_eq!(
        renderer.driver().uploads_to(UniformLocation(2)),
        vec![projection(), projection()]
    );
    Ok(())
}

#[test]
fn test_changing_one_input_reuploads_only_that_slot() -> Result<()> {
    let mut renderer = renderer();
    let (shader, mesh) = (wvp_shader(1), quad_mesh(100));
    renderer.set_shader(Some(&shader))?;
    renderer.set_vertex_buffer(Some(&mesh))?;
    renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 3)?;

    let world = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0));
    renderer.set_matrix(MatrixType::World, world)?;
    renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 3)?;

    assert_eq!(renderer.driver().count_matrix_uploads(), 4);
    assert_eq!(
        renderer.driver().uploads_to(UniformLocation(0)),
        vec![Mat4::IDENTITY, world]
    );
    Ok(())
}

#[test]
fn test_derived_matrices_follow_their_inputs() -> Result<()> {
    let mut renderer = renderer();
    let world = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
    let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
    renderer.set_matrix(MatrixType::World, world)?;
    renderer.set_matrix(MatrixType::View, view)?;
    renderer.set_matrix(MatrixType::Projection, projection())?;

    let expected = projection() * view * world;
    assert_abs_diff_eq!(
        renderer.matrix(MatrixType::WorldViewProj),
        expected,
        epsilon = 1e-5
    );
    assert_abs_diff_eq!(
        renderer.matrix(MatrixType::ViewProj),
        projection() * view,
        epsilon = 1e-5
    );

    let moved = Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0));
    renderer.set_matrix(MatrixType::World, moved)?;
    assert_abs_diff_eq!(
        renderer.matrix(MatrixType::WorldView),
        view * moved,
        epsilon = 1e-5
    );
    Ok(())
}

#[test]
fn test_instanced_guard_rejects_without_side_effects() -> Result<()> {
    let config = RendererConfig::default().with_max_instances(16);
    let mut renderer = renderer_with(RecordingDriver::new(), config);
    let (shader, mesh) = (wvp_shader(1), quad_mesh(100));
    let indices = Arc::new(IndexBuffer::new(BufferId(200), IndexFormat::U16, 6));
    renderer.set_shader(Some(&shader))?;
    renderer.set_vertex_buffer(Some(&mesh))?;
    renderer.set_index_buffer(Some(&indices))?;
    renderer.draw_indexed_primitives(PrimitiveMode::TriangleList, 0, 6)?;
    renderer.driver_mut().clear_calls();

    for count in [0, 17] {
        let err = renderer
            .draw_indexed_primitives_instanced(count, PrimitiveMode::TriangleList, 0, 6)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::InvalidInstanceCount { max: 16, .. }
        ));
    }
    assert!(renderer.driver().calls().is_empty());
    assert_eq!(renderer.stats().rejected_draws, 2);

    // The instancing mode did not flip: the next plain draw hits the cache.
    renderer.draw_indexed_primitives(PrimitiveMode::TriangleList, 0, 6)?;
    assert_eq!(renderer.driver().count_vertex_array_creates(), 0);
    assert_eq!(renderer.stats().vertex_array_hits, 0);
    assert_eq!(renderer.stats().vertex_array_builds, 1);
    Ok(())
}

#[test]
fn test_instanced_draw_streams_matrix_columns() -> Result<()> {
    let mut renderer = renderer();
    let (shader, mesh) = (wvp_shader(1), quad_mesh(100));
    renderer.set_shader(Some(&shader))?;
    renderer.set_vertex_buffer(Some(&mesh))?;

    let records: Vec<_> = (0..3)
        .map(|i| InstancingData::new(Mat4::from_translation(Vec3::new(i as f32, 0.0, 0.0))))
        .collect();
    renderer.set_instancing_data(&records)?;
    renderer.draw_primitives_instanced(3, PrimitiveMode::TriangleList, 0, 6)?;

    let instanced: Vec<(u32, u64)> = renderer
        .driver()
        .calls()
        .iter()
        .filter_map(|call| match call {
            DriverCall::EnableAttribute(index, pointer) if pointer.divisor == 1 => {
                Some((*index, pointer.offset))
            }
            _ => None,
        })
        .collect();
    assert_eq!(instanced, vec![(12, 0), (13, 16), (14, 32), (15, 48)]);
    assert_eq!(renderer.driver().last_draw().map(|d| d.instances), Some(Some(3)));
    Ok(())
}

#[test]
fn test_draw_preconditions() -> Result<()> {
    let mut renderer = renderer();
    let (shader, mesh) = (wvp_shader(1), quad_mesh(100));

    renderer.set_vertex_buffer(Some(&mesh))?;
    assert!(matches!(
        renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 3),
        Err(RenderError::NoShader)
    ));

    renderer.set_shader(Some(&shader))?;
    renderer.set_vertex_buffer(None)?;
    assert!(matches!(
        renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 3),
        Err(RenderError::NoVertexBuffer)
    ));

    renderer.set_vertex_buffer(Some(&mesh))?;
    assert!(matches!(
        renderer.draw_indexed_primitives(PrimitiveMode::TriangleList, 0, 3),
        Err(RenderError::NoIndexBuffer)
    ));

    renderer.driver_mut().set_context(None);
    assert!(matches!(
        renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 3),
        Err(RenderError::NoActiveContext)
    ));

    assert_eq!(renderer.driver().count_draws(), 0);
    assert_eq!(renderer.stats().rejected_draws, 4);
    Ok(())
}

#[test]
fn test_rejected_line_width_keeps_previous_value() -> Result<()> {
    let mut renderer = renderer();
    renderer.set_line_width(2.5)?;

    assert!(matches!(
        renderer.set_line_width(-1.0),
        Err(RenderError::InvalidLineWidth(w)) if w == -1.0
    ));
    assert_eq!(renderer.line_width(), 2.5);
    Ok(())
}

#[test]
fn test_render_states_applied_on_every_draw() -> Result<()> {
    use ember_core::renderer::{CompareFunction, RendererParameter};

    let mut renderer = renderer();
    let (shader, mesh) = (wvp_shader(1), quad_mesh(100));
    renderer.set_shader(Some(&shader))?;
    renderer.set_vertex_buffer(Some(&mesh))?;
    renderer.enable(RendererParameter::DepthBuffer, true)?;
    renderer.set_depth_func(CompareFunction::LessOrEqual)?;

    renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 3)?;
    renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 3)?;

    let applied = renderer
        .driver()
        .count(|c| matches!(c, DriverCall::ApplyStates(_)));
    assert_eq!(applied, 2);
    let states = renderer.driver().last_states().unwrap();
    assert!(states.is_enabled(RendererParameter::DepthBuffer));
    assert_eq!(states.depth_func, CompareFunction::LessOrEqual);
    assert!(renderer.is_enabled(RendererParameter::DepthBuffer));
    Ok(())
}

#[test]
fn test_fullscreen_quad_draws_owned_strip() -> Result<()> {
    let mut renderer = renderer();
    let shader = wvp_shader(1);
    let indices = Arc::new(IndexBuffer::new(BufferId(200), IndexFormat::U16, 6));
    renderer.set_shader(Some(&shader))?;
    renderer.set_index_buffer(Some(&indices))?;

    renderer.draw_fullscreen_quad()?;

    let draw = renderer.driver().last_draw().unwrap();
    assert_eq!(draw.mode, PrimitiveMode::TriangleStrip);
    assert_eq!(draw.kind, DrawKind::Arrays { first: 0, count: 4 });
    assert_eq!(draw.instances, None);
    assert!(renderer
        .driver()
        .calls()
        .contains(&DriverCall::BindBuffer(
            ember_core::renderer::BufferKind::Index,
            None
        )));
    Ok(())
}
