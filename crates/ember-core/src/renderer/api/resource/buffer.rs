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

//! Vertex and index buffers.

use super::ids::BufferId;
use super::vertex::VertexDeclaration;
use std::sync::Arc;

/// The binding point a buffer is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Vertex attribute data.
    Vertex,
    /// Element indices.
    Index,
}

/// Where the contents of a buffer live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferStorage {
    /// Video memory, owned by the driver.
    #[default]
    Hardware,
    /// System memory. Cannot be bound for drawing.
    Software,
}

/// How often a buffer is expected to be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    /// Written once, drawn many times.
    #[default]
    Static,
    /// Rewritten often.
    Dynamic,
}

/// The width of a single index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    /// 16-bit unsigned indices.
    U16,
    /// 32-bit unsigned indices.
    U32,
}

impl IndexFormat {
    /// Size in bytes of one index.
    #[inline]
    pub const fn size(self) -> u64 {
        match self {
            IndexFormat::U16 => 2,
            IndexFormat::U32 => 4,
        }
    }
}

/// A buffer of vertices laid out according to a [`VertexDeclaration`].
#[derive(Debug, Clone)]
pub struct VertexBuffer {
    /// The driver buffer holding the vertices.
    pub buffer: BufferId,
    /// The attribute layout of one vertex.
    pub declaration: Arc<VertexDeclaration>,
    /// Number of vertices in the buffer.
    pub vertex_count: u32,
    /// Where the vertices are stored.
    pub storage: BufferStorage,
}

impl VertexBuffer {
    /// Creates a hardware vertex buffer description.
    pub fn new(buffer: BufferId, declaration: Arc<VertexDeclaration>, vertex_count: u32) -> Self {
        Self {
            buffer,
            declaration,
            vertex_count,
            storage: BufferStorage::Hardware,
        }
    }

    /// Returns `true` if the vertices live in video memory.
    #[inline]
    pub fn is_hardware(&self) -> bool {
        self.storage == BufferStorage::Hardware
    }
}

/// A buffer of element indices.
///
/// A *sequential* index buffer has no backing storage: it stands for the indices
/// `start_index..start_index + index_count` and is drawn as a non-indexed range.
#[derive(Debug, Clone)]
pub struct IndexBuffer {
    /// The driver buffer, absent for sequential buffers.
    pub buffer: Option<BufferId>,
    /// Width of one index.
    pub format: IndexFormat,
    /// First index of the range.
    pub start_index: u32,
    /// Number of indices.
    pub index_count: u32,
    /// Where the indices are stored.
    pub storage: BufferStorage,
}

impl IndexBuffer {
    /// Creates a hardware index buffer description.
    pub fn new(buffer: BufferId, format: IndexFormat, index_count: u32) -> Self {
        Self {
            buffer: Some(buffer),
            format,
            start_index: 0,
            index_count,
            storage: BufferStorage::Hardware,
        }
    }

    /// Creates a sequential index buffer covering `start_index..start_index + index_count`.
    pub fn sequential(start_index: u32, index_count: u32) -> Self {
        Self {
            buffer: None,
            format: IndexFormat::U32,
            start_index,
            index_count,
            storage: BufferStorage::Software,
        }
    }

    /// Returns `true` if the buffer has no backing storage.
    #[inline]
    pub fn is_sequential(&self) -> bool {
        self.buffer.is_none()
    }

    /// Returns `true` if the indices live in video memory.
    #[inline]
    pub fn is_hardware(&self) -> bool {
        self.storage == BufferStorage::Hardware
    }
}
