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

//! Handles for the driver resources the renderer binds.
//!
//! The renderer never owns these: callers keep them alive in an `Arc` and the
//! renderer holds `Weak` references, so a dropped resource is detected instead of
//! being used after free.

pub mod buffer;
pub mod ids;
pub mod sampler;
pub mod texture;
pub mod vertex;

pub use self::buffer::*;
pub use self::ids::*;
pub use self::sampler::*;
pub use self::texture::*;
pub use self::vertex::*;
