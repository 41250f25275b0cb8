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

use super::driver::RenderDriver;
use crate::renderer::api::{ProgramId, ShaderUniform, UniformLocation};
use std::collections::HashMap;
use std::fmt::Debug;

/// A linked shader program, as seen by the renderer.
///
/// Compilation and reflection are owned by the asset side; the renderer only
/// needs the program identity and where the well-known uniforms live.
pub trait Shader: Debug {
    /// The program handle. Two shaders with the same program are the same shader.
    fn program(&self) -> ProgramId;

    /// Whether the program linked successfully and can be bound.
    fn is_compiled(&self) -> bool;

    /// The location of `uniform`, or `None` if the program does not declare it.
    fn uniform_location(&self, uniform: ShaderUniform) -> Option<UniformLocation>;

    /// Binds the textures the shader itself owns (e.g. material textures set as
    /// uniforms). Called after the program is bound, before texture units are
    /// reconciled.
    fn bind_textures(&self, _driver: &mut dyn RenderDriver) {}
}

/// A plain [`Shader`] built from reflection data.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    program: ProgramId,
    compiled: bool,
    uniforms: HashMap<ShaderUniform, UniformLocation>,
}

impl ShaderProgram {
    /// Creates a compiled program with no declared uniform.
    pub fn new(program: ProgramId) -> Self {
        Self {
            program,
            compiled: true,
            uniforms: HashMap::new(),
        }
    }

    /// Declares `uniform` at `location`.
    pub fn with_uniform(mut self, uniform: ShaderUniform, location: i32) -> Self {
        self.uniforms.insert(uniform, UniformLocation(location));
        self
    }

    /// Marks the program as failed to link.
    pub fn not_compiled(mut self) -> Self {
        self.compiled = false;
        self
    }
}

impl Shader for ShaderProgram {
    fn program(&self) -> ProgramId {
        self.program
    }

    fn is_compiled(&self) -> bool {
        self.compiled
    }

    fn uniform_location(&self, uniform: ShaderUniform) -> Option<UniformLocation> {
        self.uniforms.get(&uniform).copied()
    }
}
