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

//! The six transform matrix slots and the static table that derives three of them.
//!
//! Setting an input slot marks every slot derived from it stale. Stale slots are
//! recomputed lazily, on read or upload, by walking [`DERIVATIONS`] in order. The
//! table is sorted so that every derivation comes after the derivations of its
//! inputs, which makes a single forward pass enough to resolve any slot.

use ember_core::math::Mat4;
use ember_core::renderer::{MatrixType, RenderDriver, Shader, UniformLocation};

/// How a derived slot is computed from two other slots.
#[derive(Debug, Clone, Copy)]
pub struct Derivation {
    /// The derived slot.
    pub target: MatrixType,
    /// The slot applied first.
    pub first: MatrixType,
    /// The slot applied second.
    pub then: MatrixType,
    combine: fn(&Mat4, &Mat4) -> Mat4,
}

/// Every derived slot, inputs before dependents.
pub const DERIVATIONS: [Derivation; 3] = [
    Derivation {
        target: MatrixType::ViewProj,
        first: MatrixType::View,
        then: MatrixType::Projection,
        combine: Mat4::concatenate,
    },
    Derivation {
        target: MatrixType::WorldView,
        first: MatrixType::World,
        then: MatrixType::View,
        combine: Mat4::concatenate_affine,
    },
    Derivation {
        target: MatrixType::WorldViewProj,
        first: MatrixType::WorldView,
        then: MatrixType::Projection,
        combine: Mat4::concatenate,
    },
];

/// The slots that depend on `kind`, directly or transitively.
pub const fn dependents(kind: MatrixType) -> &'static [MatrixType] {
    match kind {
        MatrixType::World => &[MatrixType::WorldView, MatrixType::WorldViewProj],
        MatrixType::View => &[
            MatrixType::ViewProj,
            MatrixType::WorldView,
            MatrixType::WorldViewProj,
        ],
        MatrixType::Projection => &[MatrixType::ViewProj, MatrixType::WorldViewProj],
        MatrixType::WorldView => &[MatrixType::WorldViewProj],
        MatrixType::ViewProj | MatrixType::WorldViewProj => &[],
    }
}

#[derive(Debug, Clone, Copy)]
struct MatrixSlot {
    value: Mat4,
    current: bool,
    sent: bool,
    location: Option<UniformLocation>,
}

impl Default for MatrixSlot {
    fn default() -> Self {
        Self {
            value: Mat4::IDENTITY,
            current: true,
            sent: false,
            location: None,
        }
    }
}

/// Cached transform matrices with per-slot staleness and upload tracking.
#[derive(Debug, Clone, Default)]
pub struct MatrixCache {
    slots: [MatrixSlot; MatrixType::COUNT],
}

impl MatrixCache {
    /// Every slot set to identity, current, and not yet sent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` in `kind` and marks every dependent slot stale.
    pub fn set(&mut self, kind: MatrixType, value: Mat4) {
        let slot = self.slot_mut(kind);
        slot.value = value;
        slot.current = true;
        slot.sent = false;

        for &dependent in dependents(kind) {
            let slot = self.slot_mut(dependent);
            slot.current = false;
            slot.sent = false;
        }
    }

    /// Returns the value of `kind`, recomputing it first if it is stale.
    pub fn get(&mut self, kind: MatrixType) -> Mat4 {
        self.resolve(kind);
        self.slot(kind).value
    }

    /// Whether the cached value of `kind` can be used as is.
    pub fn is_current(&self, kind: MatrixType) -> bool {
        self.slot(kind).current
    }

    /// Whether the active program holds the cached value of `kind`.
    pub fn was_sent(&self, kind: MatrixType) -> bool {
        self.slot(kind).sent
    }

    /// The uniform location of `kind` in the active program.
    pub fn location(&self, kind: MatrixType) -> Option<UniformLocation> {
        self.slot(kind).location
    }

    /// Re-queries every location from `shader` and marks every slot unsent.
    pub fn rebind(&mut self, shader: &dyn Shader) {
        for kind in MatrixType::ALL {
            let slot = self.slot_mut(kind);
            slot.location = shader.uniform_location(kind.uniform());
            slot.sent = false;
        }
    }

    /// Uploads every located slot the program does not hold yet. Returns the
    /// number of uploads.
    pub fn upload(&mut self, driver: &mut dyn RenderDriver) -> u32 {
        let mut uploads = 0;
        for kind in MatrixType::ALL {
            let Some(location) = self.slot(kind).location else {
                continue;
            };
            if self.slot(kind).sent {
                continue;
            }
            let value = self.get(kind);
            driver.upload_matrix(location, &value);
            self.slot_mut(kind).sent = true;
            uploads += 1;
            log::trace!("Uploaded {kind:?} matrix to {location:?}");
        }
        uploads
    }

    fn resolve(&mut self, kind: MatrixType) {
        if self.slot(kind).current {
            return;
        }
        for derivation in DERIVATIONS {
            let needed =
                derivation.target == kind || dependents(derivation.target).contains(&kind);
            if needed && !self.slot(derivation.target).current {
                let value = (derivation.combine)(
                    &self.slot(derivation.first).value,
                    &self.slot(derivation.then).value,
                );
                let slot = self.slot_mut(derivation.target);
                slot.value = value;
                slot.current = true;
            }
        }
    }

    #[inline]
    fn slot(&self, kind: MatrixType) -> &MatrixSlot {
        &self.slots[kind as usize]
    }

    #[inline]
    fn slot_mut(&mut self, kind: MatrixType) -> &mut MatrixSlot {
        &mut self.slots[kind as usize]
    }
}
