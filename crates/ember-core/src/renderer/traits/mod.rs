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

//! Defines the collaborator traits of the rendering subsystem.
//!
//! - [`RenderDriver`]: The immediate-mode graphics API the renderer drives.
//! - [`Shader`]: A linked program and the uniforms it declares.
//! - [`RenderTarget`]: A surface that can be made current and drawn to.

mod driver;
mod shader;
mod target;

pub use self::driver::*;
pub use self::shader::{Shader, ShaderProgram};
pub use self::target::RenderTarget;
