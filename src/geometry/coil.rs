//! Helically-cut coil magnet.

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::{Axi, Chamfer, RSide, Slice};

/// A coil magnet: stacked turn slices, optionally chamfered at the ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coil {
    pub name: String,
    pub r: [f64; 2],
    pub z: [f64; 2],
    pub axi: Axi,
    #[serde(default)]
    pub chamfers: Vec<Chamfer>,
}

impl Coil {
    /// Axial slices, end stubs included.
    ///
    /// # Errors
    ///
    /// Propagates winding validation errors from [`Axi::slices`].
    pub fn slices(&self) -> Result<Vec<Slice>> {
        self.axi.slices(self.z)
    }

    /// Ordered conductor names `Cu0`..`Cu{n-1}`, one per slice.
    ///
    /// # Errors
    ///
    /// Propagates winding validation errors.
    pub fn solid_names(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        let count = self.slices()?.len();
        Ok((0..count)
            .map(|i| match prefix {
                Some(p) => format!("{p}_Cu{i}"),
                None => format!("Cu{i}"),
            })
            .collect())
    }

    /// Radial query range for the inner boundary, widened to the chamfered
    /// profile when inner chamfers exist.
    #[must_use]
    pub fn rint_range(&self) -> [f64; 2] {
        let reach = self
            .chamfers
            .iter()
            .filter(|c| c.rside == RSide::Rint)
            .map(|c| self.r[0] + c.radius())
            .fold(self.r[0], f64::max);
        [self.r[0], reach]
    }

    /// Radial query range for the outer boundary, widened to the chamfered
    /// profile when outer chamfers exist.
    #[must_use]
    pub fn rext_range(&self) -> [f64; 2] {
        let reach = self
            .chamfers
            .iter()
            .filter(|c| c.rside == RSide::Rext)
            .map(|c| self.r[1] - c.radius())
            .fold(self.r[1], f64::min);
        [reach, self.r[1]]
    }

    #[must_use]
    pub fn lc(&self) -> f64 {
        (self.r[1] - self.r[0]) / 3.0
    }
}
