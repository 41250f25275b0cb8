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

use super::driver::RenderDriver;
use crate::renderer::error::RenderError;
use std::fmt::Debug;

/// A surface the renderer draws into: a window or an offscreen texture.
pub trait RenderTarget: Debug {
    /// Whether the target can currently be drawn to.
    fn is_renderable(&self) -> bool;

    /// Whether the target owns a rendering context (windows do, render textures
    /// borrow the current one).
    fn has_context(&self) -> bool;

    /// Makes the target the destination of subsequent draws.
    /// ## Errors
    /// * `RenderError` - If the target cannot be made current.
    fn activate(&self, driver: &mut dyn RenderDriver) -> Result<(), RenderError>;

    /// Stops drawing into the target.
    fn deactivate(&self, driver: &mut dyn RenderDriver);

    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;
}
