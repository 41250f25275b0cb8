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

// Ember sandbox
// Renders a few frames into the recording driver and prints what reached it.

use anyhow::Result;
use ember_core::math::{Color, Mat4, Rect, Vec3, FRAC_PI_4};
use ember_core::renderer::mock::{MockTarget, RecordingDriver};
use ember_core::renderer::{
    BufferId, BufferKind, BufferUsage, ClearFlags, ContextId, ElementType, ElementUsage, IndexBuffer,
    IndexFormat, MatrixType, PrimitiveMode, ProgramId, RenderDriver, RenderTarget,
    RendererParameter, Shader, ShaderProgram, ShaderUniform, Texture, TextureId, VertexBuffer,
    VertexDeclaration,
};
use ember_renderer::{InstancingData, Renderer, RendererConfig};
use std::sync::Arc;

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    uv: [f32; 2],
}

const VERTICES: &[Vertex] = &[
    Vertex { position: [-0.5, -0.5, 0.0], uv: [0.0, 1.0] },
    Vertex { position: [0.5, -0.5, 0.0], uv: [1.0, 1.0] },
    Vertex { position: [0.5, 0.5, 0.0], uv: [1.0, 0.0] },
    Vertex { position: [-0.5, 0.5, 0.0], uv: [0.0, 0.0] },
];

const INDICES: &[u16] = &[0, 1, 2, 2, 3, 0];

fn upload(driver: &mut RecordingDriver, kind: BufferKind, bytes: &[u8]) -> Result<BufferId> {
    let id = driver.create_buffer(kind, bytes.len() as u64, BufferUsage::Static)?;
    driver.write_buffer(id, 0, bytes)?;
    Ok(id)
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut renderer = Renderer::new(RecordingDriver::new(), RendererConfig::default());
    renderer.initialize()?;

    let declaration = Arc::new(VertexDeclaration::new(&[
        (ElementUsage::Position, ElementType::Float3),
        (ElementUsage::TexCoord, ElementType::Float2),
    ])?);
    let vertex_id = upload(
        renderer.driver_mut(),
        BufferKind::Vertex,
        bytemuck::cast_slice(VERTICES),
    )?;
    let index_id = upload(
        renderer.driver_mut(),
        BufferKind::Index,
        bytemuck::cast_slice(INDICES),
    )?;
    let mesh = Arc::new(VertexBuffer::new(vertex_id, declaration, VERTICES.len() as u32));
    let indices = Arc::new(IndexBuffer::new(index_id, IndexFormat::U16, INDICES.len() as u32));

    let shader: Arc<dyn Shader> = Arc::new(
        ShaderProgram::new(ProgramId(1))
            .with_uniform(ShaderUniform::WorldMatrix, 0)
            .with_uniform(ShaderUniform::ViewProjMatrix, 1),
    );
    let albedo = Arc::new(Texture::new(TextureId(1), true));
    let window: Arc<dyn RenderTarget> = Arc::new(MockTarget::window(ContextId(1), WIDTH, HEIGHT));

    renderer.set_target(Some(&window))?;
    renderer.set_viewport(Rect::new(0, 0, WIDTH, HEIGHT))?;
    renderer.set_clear_color(Color::rgba(20, 20, 30, 255))?;
    renderer.enable(RendererParameter::DepthBuffer, true)?;
    renderer.set_shader(Some(&shader))?;
    renderer.set_texture(0, Some(&albedo))?;
    renderer.set_vertex_buffer(Some(&mesh))?;
    renderer.set_index_buffer(Some(&indices))?;
    renderer.set_matrix(MatrixType::View, Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0)))?;
    renderer.set_matrix(
        MatrixType::Projection,
        Mat4::perspective_rh_zo(FRAC_PI_4, WIDTH as f32 / HEIGHT as f32, 0.1, 100.0),
    )?;

    for frame in 0..3u32 {
        renderer.clear(ClearFlags::COLOR | ClearFlags::DEPTH)?;

        let angle = frame as f32 * 0.1;
        renderer.set_matrix(MatrixType::World, Mat4::from_rotation_z(angle))?;
        renderer.draw_indexed_primitives(PrimitiveMode::TriangleList, 0, INDICES.len() as u32)?;

        let instances: Vec<_> = (0..8)
            .map(|i| {
                let offset = Vec3::new(i as f32 - 3.5, 1.5, 0.0);
                InstancingData::new(Mat4::from_translation(offset))
            })
            .collect();
        renderer.set_instancing_data(&instances)?;
        renderer.draw_indexed_primitives_instanced(
            instances.len() as u32,
            PrimitiveMode::TriangleList,
            0,
            INDICES.len() as u32,
        )?;

        renderer.flush()?;
        log::info!("Frame {frame}: {:?}", renderer.stats());
        renderer.reset_stats();
    }

    log::info!(
        "{} driver calls recorded, {} vertex arrays cached",
        renderer.driver().calls().len(),
        renderer.cached_vertex_arrays()
    );

    renderer.forget_buffer(vertex_id);
    renderer.forget_buffer(index_id);
    renderer.uninitialize();
    Ok(())
}
