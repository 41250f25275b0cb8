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
use common::{init_logger, quad_mesh, renderer, renderer_with, wvp_shader};
use ember_core::math::{Color, Mat4, Rect, Vec3};
use ember_core::renderer::mock::{DriverCall, MockTarget, RecordingDriver};
use ember_core::renderer::{
    BufferUsage, ContextId, DriverExtension, PrimitiveMode, RenderDriver, RenderError,
    RenderTarget,
};
use ember_renderer::{InstancingData, Renderer, RendererCap, RendererConfig};
use std::sync::Arc;

#[test]
fn test_initialization_is_reference_counted() -> Result<()> {
    init_logger();
    let mut renderer = Renderer::new(RecordingDriver::new(), RendererConfig::default());
    renderer.initialize()?;
    renderer.initialize()?;
    assert_eq!(renderer.driver().count_buffer_creates(), 2);

    renderer.uninitialize();
    assert!(renderer.is_initialized());
    renderer.uninitialize();
    assert!(!renderer.is_initialized());

    // Extra calls are tolerated.
    renderer.uninitialize();
    assert!(!renderer.is_initialized());
    Ok(())
}

#[test]
fn test_instancing_buffer_failure_only_disables_instancing() -> Result<()> {
    init_logger();
    let mut driver = RecordingDriver::new();
    driver.fail_buffer_creation(Some(BufferUsage::Dynamic));
    let mut renderer = Renderer::new(driver, RendererConfig::default());

    renderer.initialize()?;
    assert!(!renderer.has_capability(RendererCap::Instancing));
    assert!(matches!(
        renderer.set_instancing_data(&[InstancingData::default()]),
        Err(RenderError::InstancingUnsupported)
    ));
    Ok(())
}

#[test]
fn test_quad_failure_rolls_initialization_back() {
    init_logger();
    let mut driver = RecordingDriver::new();
    driver.fail_buffer_creation(Some(BufferUsage::Static));
    let mut renderer = Renderer::new(driver, RendererConfig::default());

    assert!(matches!(
        renderer.initialize(),
        Err(RenderError::Resource(_))
    ));
    assert!(!renderer.is_initialized());

    let destroyed = renderer
        .driver()
        .count(|c| matches!(c, DriverCall::DestroyBuffer(_)));
    assert_eq!(destroyed, 1);
}

#[test]
fn test_teardown_destroys_cached_vertex_arrays() -> Result<()> {
    let mut renderer = renderer();
    let (shader, mesh_a, mesh_b) = (wvp_shader(1), quad_mesh(100), quad_mesh(101));
    renderer.set_shader(Some(&shader))?;
    for mesh in [&mesh_a, &mesh_b] {
        renderer.set_vertex_buffer(Some(mesh))?;
        renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 3)?;
    }
    assert_eq!(renderer.driver().live_vertex_arrays(), 2);

    renderer.uninitialize();
    assert_eq!(renderer.driver().live_vertex_arrays(), 0);
    Ok(())
}

#[test]
fn test_capabilities_reflect_driver() {
    let driver = RecordingDriver::new()
        .without(DriverExtension::AnisotropicFilter)
        .without(DriverExtension::BindFragDataLocation);
    let renderer = renderer_with(driver, RendererConfig::default());

    assert!(!renderer.has_capability(RendererCap::AnisotropicFilter));
    assert!(!renderer.has_capability(RendererCap::MultipleRenderTargets));
    assert_eq!(renderer.max_anisotropy_level(), 1);
    assert_eq!(renderer.max_render_targets(), 1);
    assert!(renderer.has_capability(RendererCap::HardwareBuffer));
}

#[test]
fn test_set_instancing_data_bounds() -> Result<()> {
    let config = RendererConfig::default().with_max_instances(4);
    let mut renderer = renderer_with(RecordingDriver::new(), config);

    assert!(matches!(
        renderer.set_instancing_data(&[]),
        Err(RenderError::InvalidInstanceCount { count: 0, max: 4 })
    ));
    assert!(matches!(
        renderer.set_instancing_data(&[InstancingData::default(); 5]),
        Err(RenderError::InvalidInstanceCount { count: 5, max: 4 })
    ));

    let records = [InstancingData::new(Mat4::from_scale(Vec3::new(2.0, 2.0, 2.0))); 4];
    renderer.set_instancing_data(&records)?;
    let written = renderer
        .driver()
        .calls()
        .iter()
        .rev()
        .find_map(|call| match call {
            DriverCall::WriteBuffer { size, .. } => Some(*size),
            _ => None,
        });
    assert_eq!(written, Some(256));
    Ok(())
}

#[test]
fn test_destroyed_resources_abort_draws() -> Result<()> {
    let mut renderer = renderer();
    let mesh = quad_mesh(100);
    renderer.set_vertex_buffer(Some(&mesh))?;

    let shader = wvp_shader(1);
    renderer.set_shader(Some(&shader))?;
    drop(shader);
    assert!(matches!(
        renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 3),
        Err(RenderError::ResourceDestroyed("shader"))
    ));

    let shader = wvp_shader(2);
    renderer.set_shader(Some(&shader))?;
    drop(mesh);
    assert!(matches!(
        renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 3),
        Err(RenderError::ResourceDestroyed("vertex buffer"))
    ));
    assert_eq!(renderer.driver().count_draws(), 0);
    Ok(())
}

#[test]
fn test_forgotten_buffer_evicts_its_vertex_arrays() -> Result<()> {
    let mut renderer = renderer();
    let (shader, mesh) = (wvp_shader(1), quad_mesh(100));
    renderer.set_shader(Some(&shader))?;
    renderer.set_vertex_buffer(Some(&mesh))?;
    renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 3)?;

    renderer.forget_buffer(mesh.buffer);
    assert_eq!(renderer.cached_vertex_arrays(), 0);
    assert_eq!(renderer.driver().live_vertex_arrays(), 0);

    renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 3)?;
    assert_eq!(renderer.driver().count_vertex_array_creates(), 2);
    Ok(())
}

#[test]
fn test_invalidated_context_drops_entries_without_driver_calls() -> Result<()> {
    let mut renderer = renderer();
    let (shader, mesh) = (wvp_shader(1), quad_mesh(100));
    renderer.set_shader(Some(&shader))?;
    renderer.set_vertex_buffer(Some(&mesh))?;
    renderer.draw_primitives(PrimitiveMode::TriangleList, 0, 3)?;
    renderer.driver_mut().clear_calls();

    renderer.invalidate_context(ContextId(1));
    assert_eq!(renderer.cached_vertex_arrays(), 0);
    assert!(renderer.driver().calls().is_empty());

    renderer.invalidate_context(ContextId(7));
    assert!(renderer.driver().calls().is_empty());
    Ok(())
}

#[test]
fn test_target_switching() -> Result<()> {
    let mut renderer = renderer();
    let offscreen = Arc::new(MockTarget::offscreen(ContextId(1), 256, 256));
    let window = Arc::new(MockTarget::window(ContextId(2), 1280, 720));
    let offscreen_dyn: Arc<dyn RenderTarget> = offscreen.clone();
    let window_dyn: Arc<dyn RenderTarget> = window.clone();

    renderer.set_target(Some(&offscreen_dyn))?;
    renderer.set_target(Some(&offscreen_dyn))?;
    assert_eq!(offscreen.deactivations(), 0);

    renderer.set_target(Some(&window_dyn))?;
    assert_eq!(offscreen.deactivations(), 1);
    assert_eq!(renderer.driver().current_context(), Some(ContextId(2)));

    renderer.set_target(None)?;
    assert_eq!(window.deactivations(), 0);
    assert!(renderer.target().is_none());
    Ok(())
}

#[test]
fn test_target_rejections() -> Result<()> {
    let mut renderer = renderer();
    let good: Arc<dyn RenderTarget> = Arc::new(MockTarget::window(ContextId(1), 64, 64));
    let hidden: Arc<dyn RenderTarget> =
        Arc::new(MockTarget::window(ContextId(1), 64, 64).not_renderable());
    let broken: Arc<dyn RenderTarget> =
        Arc::new(MockTarget::offscreen(ContextId(1), 64, 64).failing_activation());

    renderer.set_target(Some(&good))?;
    assert!(matches!(
        renderer.set_target(Some(&hidden)),
        Err(RenderError::TargetNotRenderable)
    ));
    assert!(renderer.target().is_some());

    assert!(matches!(
        renderer.set_target(Some(&broken)),
        Err(RenderError::TargetActivationFailed)
    ));
    assert!(renderer.target().is_none());
    Ok(())
}

#[test]
fn test_viewport_requires_target() -> Result<()> {
    let mut renderer = renderer();
    assert!(matches!(
        renderer.set_viewport(Rect::new(0, 0, 10, 10)),
        Err(RenderError::NoTarget)
    ));

    let target: Arc<dyn RenderTarget> = Arc::new(MockTarget::offscreen(ContextId(1), 100, 100));
    renderer.set_target(Some(&target))?;
    renderer.set_scissor_rect(Rect::new(0, 0, 100, 40))?;
    assert!(renderer
        .driver()
        .calls()
        .contains(&DriverCall::SetScissorRect(Rect::new(0, 60, 100, 40))));
    assert_eq!(renderer.scissor_rect(), Rect::new(0, 0, 100, 40));
    Ok(())
}

#[test]
fn test_clear_values_need_a_context() -> Result<()> {
    let mut renderer = renderer();
    renderer.set_clear_color(Color::rgba(10, 20, 30, 255))?;
    renderer.set_clear_depth(1.0)?;
    renderer.set_clear_stencil(0)?;
    assert!(renderer
        .driver()
        .calls()
        .contains(&DriverCall::SetClearColor(Color::rgba(10, 20, 30, 255))));

    renderer.driver_mut().set_context(None);
    assert!(matches!(
        renderer.set_clear_color(Color::BLACK),
        Err(RenderError::NoActiveContext)
    ));
    assert!(renderer.flush().is_err());
    Ok(())
}
