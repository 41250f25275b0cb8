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

//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use ember_core::math::Mat4;
use ember_core::renderer::mock::RecordingDriver;
use ember_core::renderer::{
    BufferId, ElementType, ElementUsage, ProgramId, Shader, ShaderProgram, ShaderUniform,
    VertexBuffer, VertexDeclaration,
};
use ember_renderer::{Renderer, RendererConfig};
use std::sync::Arc;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn renderer_with(driver: RecordingDriver, config: RendererConfig) -> Renderer<RecordingDriver> {
    init_logger();
    let mut renderer = Renderer::new(driver, config);
    renderer
        .initialize()
        .expect("renderer should initialize against the recording driver");
    renderer
}

pub fn renderer() -> Renderer<RecordingDriver> {
    renderer_with(RecordingDriver::new(), RendererConfig::default())
}

/// A shader declaring the three input matrices at locations 0, 1 and 2.
pub fn wvp_shader(program: usize) -> Arc<dyn Shader> {
    Arc::new(
        ShaderProgram::new(ProgramId(program))
            .with_uniform(ShaderUniform::WorldMatrix, 0)
            .with_uniform(ShaderUniform::ViewMatrix, 1)
            .with_uniform(ShaderUniform::ProjMatrix, 2),
    )
}

/// A position and texture coordinate mesh stored in `buffer`.
pub fn quad_mesh(buffer: usize) -> Arc<VertexBuffer> {
    let declaration = VertexDeclaration::new(&[
        (ElementUsage::Position, ElementType::Float3),
        (ElementUsage::TexCoord, ElementType::Float2),
    ])
    .expect("valid declaration");
    Arc::new(VertexBuffer::new(BufferId(buffer), Arc::new(declaration), 4))
}

pub fn projection() -> Mat4 {
    Mat4::perspective_rh_zo(ember_core::math::FRAC_PI_4, 16.0 / 9.0, 0.1, 100.0)
}
