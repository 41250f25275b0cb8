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

//! Defines the hierarchy of error types for the rendering subsystem.

use super::api::BufferId;
use std::fmt;

/// An error related to the creation or use of a driver-side resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// The driver could not allocate the resource.
    CreationFailed {
        /// A short description of what was being created.
        what: String,
        /// Details reported by the driver.
        details: String,
    },
    /// A handle did not name a live driver resource.
    InvalidHandle,
    /// A write or read went past the end of a buffer.
    OutOfBounds {
        /// The buffer that was accessed.
        buffer: BufferId,
        /// The offset, in bytes, of the access.
        offset: u64,
        /// The size, in bytes, of the access.
        size: u64,
    },
    /// A vertex declaration described the same attribute usage twice.
    InvalidDeclaration(String),
    /// A backend-specific error occurred.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::CreationFailed { what, details } => {
                write!(f, "Failed to create {what}: {details}")
            }
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle"),
            ResourceError::OutOfBounds {
                buffer,
                offset,
                size,
            } => write!(
                f,
                "Access of {size} bytes at offset {offset} is out of bounds for buffer {buffer:?}"
            ),
            ResourceError::InvalidDeclaration(msg) => {
                write!(f, "Invalid vertex declaration: {msg}")
            }
            ResourceError::BackendError(msg) => write!(f, "Backend error: {msg}"),
        }
    }
}

impl std::error::Error for ResourceError {}

/// A high-level error for a renderer operation that was rejected.
///
/// Every variant except [`RenderError::Resource`] is a precondition failure: the
/// operation was abandoned before any cached state changed, and the caller may
/// retry after fixing the input.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The renderer has not been initialized.
    NotInitialized,
    /// No rendering context is current on the calling thread.
    NoActiveContext,
    /// A draw was issued without a shader.
    NoShader,
    /// The shader is not ready to be bound.
    ShaderNotCompiled,
    /// A draw was issued without a vertex buffer.
    NoVertexBuffer,
    /// An indexed draw was issued without an index buffer.
    NoIndexBuffer,
    /// The operation needs a render target and none is bound.
    NoTarget,
    /// A buffer that must live in video memory uses software storage.
    SoftwareBuffer,
    /// A texture unit index was not below the number of units.
    TextureUnitOutOfRange {
        /// The requested unit.
        unit: u32,
        /// The number of available units.
        count: u32,
    },
    /// A line width that is not strictly positive.
    InvalidLineWidth(f32),
    /// A point size that is not strictly positive.
    InvalidPointSize(f32),
    /// An instance count outside of `(0, max]`.
    InvalidInstanceCount {
        /// The requested count.
        count: u32,
        /// The configured maximum.
        max: u32,
    },
    /// Instancing was requested but the driver does not support it.
    InstancingUnsupported,
    /// The render target cannot be drawn to.
    TargetNotRenderable,
    /// The render target failed to make its context current.
    TargetActivationFailed,
    /// A rectangle does not fit inside the current target.
    RectOutOfBounds {
        /// The target width.
        width: u32,
        /// The target height.
        height: u32,
    },
    /// A resource referenced by the renderer was dropped by its owner.
    ResourceDestroyed(&'static str),
    /// A driver resource could not be created or used.
    Resource(ResourceError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NotInitialized => write!(f, "Renderer is not initialized"),
            RenderError::NoActiveContext => write!(f, "No active context"),
            RenderError::NoShader => write!(f, "No shader"),
            RenderError::ShaderNotCompiled => write!(f, "Shader is not compiled"),
            RenderError::NoVertexBuffer => write!(f, "No vertex buffer"),
            RenderError::NoIndexBuffer => write!(f, "No index buffer"),
            RenderError::NoTarget => write!(f, "No render target"),
            RenderError::SoftwareBuffer => write!(f, "Buffer is not stored in video memory"),
            RenderError::TextureUnitOutOfRange { unit, count } => {
                write!(f, "Texture unit out of range ({unit} >= {count})")
            }
            RenderError::InvalidLineWidth(width) => {
                write!(f, "Line width must be over zero (got {width})")
            }
            RenderError::InvalidPointSize(size) => {
                write!(f, "Point size must be over zero (got {size})")
            }
            RenderError::InvalidInstanceCount { count, max } => {
                write!(f, "Instance count must be in (0, {max}] (got {count})")
            }
            RenderError::InstancingUnsupported => write!(f, "Instancing is not supported"),
            RenderError::TargetNotRenderable => write!(f, "Target is not renderable"),
            RenderError::TargetActivationFailed => write!(f, "Failed to activate target"),
            RenderError::RectOutOfBounds { width, height } => {
                write!(f, "Rectangle is out of target bounds ({width}x{height})")
            }
            RenderError::ResourceDestroyed(what) => {
                write!(f, "Bound {what} was destroyed while still referenced")
            }
            RenderError::Resource(err) => write!(f, "Resource error: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Resource(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::Resource(err)
    }
}
