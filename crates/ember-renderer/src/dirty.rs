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

//! Coarse dirty bits raised by setters and cleared by reconciliation.

/// The categories of cached state that differ from what the driver holds.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct DirtyFlags {
    bits: u8,
}

impl DirtyFlags {
    pub const NONE: Self = Self { bits: 0 };
    /// At least one matrix slot needs uploading.
    pub const MATRICES: Self = Self { bits: 1 << 0 };
    /// The shader changed identity; uniform locations must be re-queried.
    pub const SHADER: Self = Self { bits: 1 << 1 };
    /// At least one texture unit is pending.
    pub const TEXTURES: Self = Self { bits: 1 << 2 };
    /// The vertex array must be looked up or rebuilt.
    pub const VERTEX_ARRAY: Self = Self { bits: 1 << 3 };

    /// State of a freshly initialized renderer.
    pub const INITIAL: Self = Self {
        bits: Self::MATRICES.bits | Self::SHADER.bits | Self::VERTEX_ARRAY.bits,
    };

    pub const fn contains(&self, other: Self) -> bool {
        (self.bits & other.bits) == other.bits
    }

    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn insert(&mut self, other: Self) {
        self.bits |= other.bits;
    }

    pub fn remove(&mut self, other: Self) {
        self.bits &= !other.bits;
    }
}

impl std::fmt::Debug for DirtyFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = [
            (Self::MATRICES, "MATRICES"),
            (Self::SHADER, "SHADER"),
            (Self::TEXTURES, "TEXTURES"),
            (Self::VERTEX_ARRAY, "VERTEX_ARRAY"),
        ];
        let mut set = f.debug_set();
        for (flag, name) in names {
            if self.contains(flag) {
                set.entry(&format_args!("{name}"));
            }
        }
        set.finish()
    }
}
