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

//! Vertex layouts.

use crate::renderer::error::ResourceError;

/// The semantic of a vertex attribute.
///
/// Each usage is bound to a fixed attribute slot so that shaders can declare their
/// inputs without querying the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementUsage {
    /// Vertex position.
    Position,
    /// Vertex normal.
    Normal,
    /// Per-vertex color.
    Diffuse,
    /// Tangent vector.
    Tangent,
    /// First texture coordinate set.
    TexCoord,
}

impl ElementUsage {
    /// Every usage, in attribute slot order.
    pub const ALL: [ElementUsage; 5] = [
        ElementUsage::Position,
        ElementUsage::Normal,
        ElementUsage::Diffuse,
        ElementUsage::Tangent,
        ElementUsage::TexCoord,
    ];

    /// The attribute slot the usage is bound to.
    ///
    /// `TexCoord` is the first slot of the texture coordinate range.
    #[inline]
    pub const fn attribute_index(self) -> u32 {
        match self {
            ElementUsage::Position => 0,
            ElementUsage::Normal => 1,
            ElementUsage::Diffuse => 2,
            ElementUsage::Tangent => 3,
            ElementUsage::TexCoord => 4,
        }
    }
}

/// The data type of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Four 8-bit channels normalized to `[0, 1]`.
    Color,
    /// One `f32`.
    Float1,
    /// Two `f32`.
    Float2,
    /// Three `f32`.
    Float3,
    /// Four `f32`.
    Float4,
}

impl ElementType {
    /// Number of components.
    #[inline]
    pub const fn component_count(self) -> u32 {
        match self {
            ElementType::Float1 => 1,
            ElementType::Float2 => 2,
            ElementType::Float3 => 3,
            ElementType::Color | ElementType::Float4 => 4,
        }
    }

    /// Size in bytes.
    #[inline]
    pub const fn size(self) -> u32 {
        match self {
            ElementType::Color => 4,
            other => other.component_count() * 4,
        }
    }

    /// Whether integer components are normalized when read by the shader.
    #[inline]
    pub const fn is_normalized(self) -> bool {
        matches!(self, ElementType::Color)
    }
}

/// One attribute of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexElement {
    /// What the attribute means.
    pub usage: ElementUsage,
    /// How the attribute is stored.
    pub element_type: ElementType,
    /// Byte offset from the start of the vertex.
    pub offset: u32,
}

/// The attribute layout shared by every vertex of a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexDeclaration {
    elements: Vec<VertexElement>,
    stride: u32,
}

impl VertexDeclaration {
    /// Builds a declaration from `(usage, type)` pairs packed in order.
    ///
    /// ## Errors
    ///
    /// Returns [`ResourceError::InvalidDeclaration`] if the list is empty or a usage
    /// appears more than once.
    pub fn new(layout: &[(ElementUsage, ElementType)]) -> Result<Self, ResourceError> {
        if layout.is_empty() {
            log::error!("Vertex declaration rejected: no element");
            return Err(ResourceError::InvalidDeclaration(
                "a declaration needs at least one element".to_string(),
            ));
        }

        let mut elements: Vec<VertexElement> = Vec::with_capacity(layout.len());
        let mut offset = 0;
        for &(usage, element_type) in layout {
            if elements.iter().any(|e| e.usage == usage) {
                log::error!("Vertex declaration rejected: {usage:?} is declared twice");
                return Err(ResourceError::InvalidDeclaration(format!(
                    "usage {usage:?} is declared twice"
                )));
            }
            elements.push(VertexElement {
                usage,
                element_type,
                offset,
            });
            offset += element_type.size();
        }

        Ok(Self {
            elements,
            stride: offset,
        })
    }

    /// Returns the element with the given usage, if declared.
    pub fn element(&self, usage: ElementUsage) -> Option<&VertexElement> {
        self.elements.iter().find(|e| e.usage == usage)
    }

    /// All elements, in declaration order.
    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }

    /// Size in bytes of one vertex.
    pub fn stride(&self) -> u32 {
        self.stride
    }
}
