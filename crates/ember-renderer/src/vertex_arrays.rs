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

//! Vertex array objects cached by the buffers and context they were built for.
//!
//! Describing attribute layouts is the expensive part of a draw on drivers with
//! vertex array objects. Each distinct combination of context, buffers and
//! instancing mode is described once, then reused until one of its buffers is
//! forgotten, its context is invalidated, or the renderer is torn down.

use crate::instancing::{InstancingData, INSTANCE_MATRIX_SLOTS};
use ember_core::renderer::{
    AttributePointer, BufferId, BufferKind, ContextId, ElementType, ElementUsage, IndexBuffer,
    RenderDriver, VertexArrayId, VertexBuffer, VertexDeclaration,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Identifies the driver state captured by a vertex array.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexArrayKey {
    /// Vertex arrays are not shared between contexts.
    pub context: ContextId,
    /// The index buffer bound into the array. `None` both for non-indexed drawing
    /// and for sequential index buffers, which capture the same state.
    pub index_buffer: Option<BufferId>,
    /// The vertex buffer the attributes read from.
    pub vertex_buffer: BufferId,
    /// The attribute layout described over `vertex_buffer`, compared by content.
    /// The same storage read through another layout needs its own vertex array.
    pub layout: Arc<VertexDeclaration>,
    /// Whether the per-instance matrix attributes are enabled.
    pub instancing: bool,
}

/// Maps a [`VertexArrayKey`] to the vertex array built for it.
#[derive(Debug, Default)]
pub struct VertexArrayCache {
    entries: HashMap<VertexArrayKey, VertexArrayId>,
}

impl VertexArrayCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the vertex array built for `key`.
    pub fn get(&self, key: &VertexArrayKey) -> Option<VertexArrayId> {
        self.entries.get(key).copied()
    }

    /// Records the vertex array built for `key`.
    pub fn insert(&mut self, key: VertexArrayKey, id: VertexArrayId) {
        if let Some(previous) = self.entries.insert(key.clone(), id) {
            log::warn!("Vertex array {previous:?} for {key:?} replaced without being destroyed");
        }
    }

    /// Number of cached vertex arrays.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evicts every entry that references `buffer`. Entries of `current` are
    /// destroyed; entries of other contexts cannot be, and are only dropped.
    ///
    /// Returns the number of evicted entries.
    pub fn forget_buffer(
        &mut self,
        buffer: BufferId,
        driver: &mut dyn RenderDriver,
        current: Option<ContextId>,
    ) -> usize {
        self.evict(driver, current, |key| {
            key.vertex_buffer == buffer || key.index_buffer == Some(buffer)
        })
    }

    /// Evicts every entry of a destroyed context. No driver call is made: the
    /// handles died with the context.
    ///
    /// Returns the number of evicted entries.
    pub fn invalidate_context(&mut self, context: ContextId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.context != context);
        before - self.entries.len()
    }

    /// Evicts every entry, destroying those of `current`.
    pub fn clear(&mut self, driver: &mut dyn RenderDriver, current: Option<ContextId>) {
        self.evict(driver, current, |_| true);
    }

    fn evict(
        &mut self,
        driver: &mut dyn RenderDriver,
        current: Option<ContextId>,
        predicate: impl Fn(&VertexArrayKey) -> bool,
    ) -> usize {
        let mut evicted = 0;
        self.entries.retain(|key, id| {
            if !predicate(key) {
                return true;
            }
            if Some(key.context) == current {
                driver.destroy_vertex_array(*id);
            } else {
                log::debug!("Dropping vertex array {id:?} of inactive context {:?}", key.context);
            }
            evicted += 1;
            false
        });
        evicted
    }
}

/// Describes the attribute layout of `vertex_buffer` to the driver.
///
/// Every usage slot the declaration does not use is disabled. With an
/// `instancing` buffer, the four slots starting at `instance_base` read one
/// matrix column each and advance once per instance; without, they are disabled.
/// Finally the index buffer is bound, or unbound for non-indexed and sequential
/// drawing.
pub fn describe_attributes(
    driver: &mut dyn RenderDriver,
    vertex_buffer: &VertexBuffer,
    index_buffer: Option<&IndexBuffer>,
    instancing: Option<BufferId>,
    instance_base: u32,
) {
    driver.bind_buffer(BufferKind::Vertex, Some(vertex_buffer.buffer));

    let declaration = &vertex_buffer.declaration;
    for usage in ElementUsage::ALL {
        let index = usage.attribute_index();
        match declaration.element(usage) {
            Some(element) => driver.enable_attribute(
                index,
                &AttributePointer {
                    buffer: vertex_buffer.buffer,
                    components: element.element_type.component_count(),
                    element_type: element.element_type,
                    normalized: element.element_type.is_normalized(),
                    stride: declaration.stride(),
                    offset: u64::from(element.offset),
                    divisor: 0,
                },
            ),
            None => driver.disable_attribute(index),
        }
    }

    match instancing {
        Some(buffer) => {
            driver.bind_buffer(BufferKind::Vertex, Some(buffer));
            let stride = std::mem::size_of::<InstancingData>() as u32;
            let column = std::mem::size_of::<[f32; 4]>() as u64;
            for i in 0..INSTANCE_MATRIX_SLOTS {
                driver.enable_attribute(
                    instance_base + i,
                    &AttributePointer {
                        buffer,
                        components: 4,
                        element_type: ElementType::Float4,
                        normalized: false,
                        stride,
                        offset: u64::from(i) * column,
                        divisor: 1,
                    },
                );
            }
        }
        None => {
            for i in 0..INSTANCE_MATRIX_SLOTS {
                driver.disable_attribute(instance_base + i);
            }
        }
    }

    let index = index_buffer.filter(|ib| !ib.is_sequential()).and_then(|ib| ib.buffer);
    driver.bind_buffer(BufferKind::Index, index);
}
