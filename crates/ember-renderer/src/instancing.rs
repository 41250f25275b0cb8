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

//! Per-instance data streamed to instanced draws.

use ember_core::math::Mat4;
use ember_core::renderer::ElementUsage;

/// The record uploaded for each instance of an instanced draw.
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct InstancingData {
    /// Object to world transform of the instance.
    pub world_matrix: Mat4,
}

impl InstancingData {
    /// Creates a record from a world matrix.
    pub const fn new(world_matrix: Mat4) -> Self {
        Self { world_matrix }
    }
}

/// Attribute slots taken by the per-instance world matrix, one per column.
pub const INSTANCE_MATRIX_SLOTS: u32 = 4;

/// The first attribute slot of the per-instance matrix: right after the texture
/// coordinate range.
pub const fn instance_attribute_base(texture_coordinate_slots: u32) -> u32 {
    ElementUsage::TexCoord.attribute_index() + texture_coordinate_slots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_layout() {
        assert_eq!(std::mem::size_of::<InstancingData>(), 64);
        let records = [InstancingData::new(Mat4::IDENTITY); 2];
        let bytes: &[u8] = bytemuck::cast_slice(&records);
        assert_eq!(bytes.len(), 128);
    }

    #[test]
    fn test_instance_slots_follow_texture_coordinates() {
        assert_eq!(instance_attribute_base(8), 12);
        assert_eq!(instance_attribute_base(0), ElementUsage::TexCoord.attribute_index());
    }
}
