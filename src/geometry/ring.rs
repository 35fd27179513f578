//! Connection ring between two coils of an insert.

use serde::{Deserialize, Serialize};

/// A ring: an annular block with four characteristic radii. `r[1]`..`r[2]`
/// bounds the cooling-slit band; `z` is the ring's own axial extent, placed
/// by the insert at build time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ring {
    pub name: String,
    pub r: [f64; 4],
    pub z: [f64; 2],
}

impl Ring {
    #[must_use]
    pub fn height(&self) -> f64 {
        self.z[1] - self.z[0]
    }

    #[must_use]
    pub fn solid_name(&self, prefix: Option<&str>) -> String {
        match prefix {
            Some(p) => format!("{p}_{}", self.name),
            None => self.name.clone(),
        }
    }

    #[must_use]
    pub fn lc(&self) -> f64 {
        (self.r[3] - self.r[0]) / 10.0
    }
}
