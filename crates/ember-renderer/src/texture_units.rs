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

//! Per-unit texture and sampler bindings with independent dirty flags.

use crate::stats::RendererStats;
use ember_core::renderer::{RenderDriver, RenderError, Texture, TextureSampler};
use std::collections::BTreeSet;
use std::sync::{Arc, Weak};

#[derive(Debug, Clone, Default)]
struct TextureUnit {
    texture: Option<Weak<Texture>>,
    sampler: TextureSampler,
    texture_dirty: bool,
    sampler_dirty: bool,
}

impl TextureUnit {
    fn live_texture(&self) -> Option<Arc<Texture>> {
        self.texture.as_ref().and_then(Weak::upgrade)
    }

    fn holds(&self, texture: Option<&Arc<Texture>>) -> bool {
        match (&self.texture, texture) {
            (None, None) => true,
            (Some(held), Some(new)) => std::ptr::eq(held.as_ptr(), Arc::as_ptr(new)),
            _ => false,
        }
    }
}

/// The texture unit table.
///
/// Units changed since the last reconciliation are kept in a pending set. The
/// set is ordered so units are always pushed to the driver in index order.
#[derive(Debug, Clone, Default)]
pub struct TextureUnits {
    units: Vec<TextureUnit>,
    pending: BTreeSet<u32>,
}

impl TextureUnits {
    /// Creates `count` empty units with default samplers.
    pub fn new(count: u32) -> Self {
        Self {
            units: vec![TextureUnit::default(); count as usize],
            pending: BTreeSet::new(),
        }
    }

    /// Number of units.
    pub fn len(&self) -> u32 {
        self.units.len() as u32
    }

    /// Whether the table has no unit.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Binds `texture` to `unit`, or clears it with `None`.
    ///
    /// Returns `Ok(true)` if the unit changed and was scheduled for reconciliation,
    /// `Ok(false)` if it already held that exact texture.
    pub fn set_texture(
        &mut self,
        unit: u32,
        texture: Option<&Arc<Texture>>,
    ) -> Result<bool, RenderError> {
        let slot = self.unit_mut(unit)?;
        if slot.holds(texture) {
            return Ok(false);
        }

        slot.texture = texture.map(Arc::downgrade);
        slot.texture_dirty = true;
        if let Some(texture) = texture {
            if slot.sampler.use_mipmaps(texture.has_mipmaps) {
                slot.sampler_dirty = true;
            }
        }

        self.pending.insert(unit);
        Ok(true)
    }

    /// Replaces the sampler of `unit`. Always schedules the unit.
    pub fn set_sampler(&mut self, unit: u32, sampler: TextureSampler) -> Result<(), RenderError> {
        let slot = self.unit_mut(unit)?;
        slot.sampler = sampler;
        slot.sampler_dirty = true;
        if let Some(texture) = slot.live_texture() {
            slot.sampler.use_mipmaps(texture.has_mipmaps);
        }

        self.pending.insert(unit);
        Ok(())
    }

    /// The texture bound to `unit`, if any and still alive.
    pub fn texture(&self, unit: u32) -> Option<Arc<Texture>> {
        self.units.get(unit as usize)?.live_texture()
    }

    /// The sampler of `unit`.
    pub fn sampler(&self, unit: u32) -> Option<TextureSampler> {
        self.units.get(unit as usize).map(|u| u.sampler)
    }

    /// Whether `unit` waits for reconciliation.
    pub fn is_pending(&self, unit: u32) -> bool {
        self.pending.contains(&unit)
    }

    /// Pushes every pending unit to the driver.
    ///
    /// With sampler objects, texture and sampler are rebound independently, each
    /// only if dirty. Without them, sampler parameters live in the texture object
    /// and are reapplied together with every texture bind.
    pub fn reconcile(
        &mut self,
        driver: &mut dyn RenderDriver,
        sampler_objects: bool,
        stats: &mut RendererStats,
    ) {
        let pending = std::mem::take(&mut self.pending);
        for index in pending {
            let Some(unit) = self.units.get_mut(index as usize) else {
                continue;
            };

            let texture = unit.live_texture();
            if texture.is_none() && unit.texture.take().is_some() {
                log::warn!("Texture on unit {index} was destroyed while bound, unbinding it");
                unit.texture_dirty = true;
            }

            if sampler_objects {
                if unit.texture_dirty {
                    driver.bind_texture(index, texture.as_deref());
                    unit.texture_dirty = false;
                    stats.texture_binds = stats.texture_binds.saturating_add(1);
                }
                if unit.sampler_dirty {
                    driver.bind_sampler(index, &unit.sampler);
                    unit.sampler_dirty = false;
                    stats.sampler_binds = stats.sampler_binds.saturating_add(1);
                }
            } else {
                driver.bind_texture(index, texture.as_deref());
                unit.texture_dirty = false;
                stats.texture_binds = stats.texture_binds.saturating_add(1);
                if let Some(texture) = &texture {
                    driver.apply_sampler(index, texture, &unit.sampler);
                    unit.sampler_dirty = false;
                    stats.sampler_binds = stats.sampler_binds.saturating_add(1);
                }
            }
        }
    }

    /// Rebinds every live texture to its unit, without touching dirty state.
    pub fn rebind_all(&self, driver: &mut dyn RenderDriver) {
        for (index, unit) in self.units.iter().enumerate() {
            if let Some(texture) = unit.live_texture() {
                driver.bind_texture(index as u32, Some(&texture));
            }
        }
    }

    fn unit_mut(&mut self, unit: u32) -> Result<&mut TextureUnit, RenderError> {
        let count = self.len();
        self.units
            .get_mut(unit as usize)
            .ok_or(RenderError::TextureUnitOutOfRange { unit, count })
    }
}
