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

//! Texture handles.

use super::ids::TextureId;

/// The dimensionality of a texture, which selects its bind target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureKind {
    /// A one-dimensional texture.
    D1,
    /// A two-dimensional texture.
    #[default]
    D2,
    /// A three-dimensional texture.
    D3,
    /// Six square faces forming a cube.
    Cubemap,
    /// An array of one-dimensional layers.
    D1Array,
    /// An array of two-dimensional layers.
    D2Array,
}

/// A texture that can be bound to a texture unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    /// The driver texture object.
    pub id: TextureId,
    /// The bind target of the texture.
    pub kind: TextureKind,
    /// Whether a full mipmap chain is available.
    pub has_mipmaps: bool,
}

impl Texture {
    /// Creates a 2D texture handle.
    pub fn new(id: TextureId, has_mipmaps: bool) -> Self {
        Self {
            id,
            kind: TextureKind::D2,
            has_mipmaps,
        }
    }
}
