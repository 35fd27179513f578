//! Insert magnet: concentric coils joined by connection rings.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::math::Box2;
use crate::regions::label::{Boundary, Label, Stem};

use super::{Coil, Ring};

/// An insert: `coils[i]` and `coils[i+1]` are joined by `rings[i]`, rings
/// alternating between the upper (even index) and lower (odd index) ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insert {
    pub name: String,
    pub innerbore: f64,
    pub outerbore: f64,
    pub coils: Vec<Coil>,
    #[serde(default)]
    pub rings: Vec<Ring>,
}

impl Insert {
    /// Whether ring `i` sits at the upper end of its coil pair.
    #[must_use]
    pub fn ring_on_top(i: usize) -> bool {
        i % 2 == 0
    }

    /// Axial offset applied to ring `i`'s own z extent at build time.
    #[must_use]
    pub fn ring_offset(&self, i: usize) -> f64 {
        let coil = &self.coils[i];
        if Self::ring_on_top(i) {
            coil.z[1] - self.rings[i].z[0]
        } else {
            coil.z[0] - self.rings[i].z[1]
        }
    }

    /// Radial/axial bounding extents over all coils and rings.
    #[must_use]
    pub fn bounding_extents(&self) -> ([f64; 2], [f64; 2]) {
        let mut r = [f64::INFINITY, f64::NEG_INFINITY];
        let mut z = [f64::INFINITY, f64::NEG_INFINITY];
        for c in &self.coils {
            r[0] = r[0].min(c.r[0]);
            r[1] = r[1].max(c.r[1]);
            z[0] = z[0].min(c.z[0]);
            z[1] = z[1].max(c.z[1]);
        }
        for (i, ring) in self.rings.iter().enumerate() {
            r[0] = r[0].min(ring.r[0]);
            r[1] = r[1].max(ring.r[3]);
            let off = self.ring_offset(i);
            z[0] = z[0].min(ring.z[0] + off);
            z[1] = z[1].max(ring.z[1] + off);
        }
        (r, z)
    }

    /// Ordered solid names: every coil's slices, then every ring.
    ///
    /// # Errors
    ///
    /// Propagates winding validation errors from the coils.
    pub fn solid_names(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for coil in &self.coils {
            let cname = match prefix {
                Some(p) => format!("{p}_{}", coil.name),
                None => coil.name.clone(),
            };
            names.extend(coil.solid_names(Some(&cname))?);
        }
        for ring in &self.rings {
            names.push(ring.solid_name(prefix));
        }
        Ok(names)
    }

    /// Per-channel (bounding box, characteristic length) pairs, innermost
    /// channel first. There are `coils.len() + 1` hydraulic channels.
    #[must_use]
    pub fn channel_boxes(&self) -> Vec<(Box2, f64)> {
        let n = self.coils.len();
        let mut boxes = Vec::with_capacity(n + 1);
        for k in 0..=n {
            let r0 = if k == 0 {
                self.innerbore
            } else {
                self.coils[k - 1].r[1]
            };
            let r1 = if k == n {
                self.outerbore
            } else {
                self.coils[k].r[0]
            };
            // axial reach includes the rings capping this gap
            let mut z0 = f64::INFINITY;
            let mut z1 = f64::NEG_INFINITY;
            for idx in k.saturating_sub(1)..=k.min(n - 1) {
                if idx < n {
                    z0 = z0.min(self.coils[idx].z[0]);
                    z1 = z1.max(self.coils[idx].z[1]);
                }
            }
            // ring i touches channels i (inner face), i+1 (slits), i+2
            // (outer face)
            for (i, ring) in self.rings.iter().enumerate() {
                if k >= i && k <= i + 2 {
                    let off = self.ring_offset(i);
                    z0 = z0.min(ring.z[0] + off);
                    z1 = z1.max(ring.z[1] + off);
                }
            }
            let lc = (r1 - r0) / 3.0;
            boxes.push((Box2::new(r0, z0, r1, z1), lc));
        }
        boxes
    }

    /// Boundary labels feeding each cooling channel, innermost first.
    ///
    /// Channel `k` lies between coil `k` and coil `k+1` (bores at the ends);
    /// it collects the facing radial boundaries plus the ring faces that
    /// open into it.
    #[must_use]
    pub fn channels(&self, prefix: Option<&str>) -> Vec<Vec<Label>> {
        let n = self.coils.len();
        let coil_label = |i: usize, b: Boundary| {
            let cname = match prefix {
                Some(p) => format!("{p}_{}", self.coils[i].name),
                None => self.coils[i].name.clone(),
            };
            Label::boundary(&cname, b)
        };
        let ring_label = |i: usize, b: Boundary| {
            let rname = self.rings[i].solid_name(prefix);
            Label::boundary(&rname, b)
        };

        let mut channels = Vec::with_capacity(n + 1);
        for k in 0..=n {
            let mut members = Vec::new();
            if k > 0 {
                members.push(coil_label(k - 1, Boundary::RExt));
            }
            if k < n {
                members.push(coil_label(k, Boundary::RInt));
            }
            // ring k couples coils k and k+1; its inner face opens into
            // channel k, its outer face into channel k+2
            if k < self.rings.len() {
                members.push(ring_label(k, Boundary::R0n));
            }
            if k >= 2 && k - 2 < self.rings.len() {
                members.push(ring_label(k - 2, Boundary::R1n));
            }
            if k >= 1 && k - 1 < self.rings.len() {
                members.push(ring_label(k - 1, Boundary::CoolingSlits));
            }
            channels.push(members);
        }
        channels
    }

    /// Prefixed channel label for channel `k`.
    #[must_use]
    pub fn channel_label(&self, prefix: Option<&str>, k: u32) -> Label {
        Label::new(prefix, Stem::Channel(k))
    }
}
