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

//! Provides the backend-agnostic rendering contracts.
//!
//! This module defines the vocabulary shared by the renderer and the graphics
//! backends: fixed-function state descriptions, resource handles, the collaborator
//! traits for shaders and render targets, and the [`RenderDriver`] trait that a
//! concrete backend implements.

pub mod api;
pub mod error;
#[cfg(feature = "mock")]
pub mod mock;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::error::{RenderError, ResourceError};
pub use self::traits::{
    AttributePointer, DrawCommand, DrawKind, DriverExtension, DriverLimits, RenderDriver,
    RenderTarget, Shader, ShaderProgram,
};
