//! Radially-cooled plate magnet (Bitter-type).

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::{Axi, CoolingSlits, SectorSlit, Slice, TieRod};

/// A plate magnet: an annular conductor wound as stacked turns, cooled by
/// axial slits at fixed radii.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plate {
    pub name: String,
    pub r: [f64; 2],
    pub z: [f64; 2],
    pub axi: Axi,
    #[serde(default)]
    pub cooling_slits: Option<CoolingSlits>,
    /// Tie-rod layout, used by the full 2D sector model only.
    #[serde(default)]
    pub tierod: Option<TieRod>,
    /// Angular slit patterns, used by the full 2D sector model only.
    #[serde(default)]
    pub sector_slits: Vec<SectorSlit>,
}

impl Plate {
    /// Axial slices of the turn stack, stubs included.
    ///
    /// # Errors
    ///
    /// Propagates winding validation errors from [`Axi::slices`].
    pub fn slices(&self) -> Result<Vec<Slice>> {
        self.axi.slices(self.z)
    }

    #[must_use]
    pub fn slit_radii(&self) -> &[f64] {
        self.cooling_slits
            .as_ref()
            .map_or(&[], |s| s.radii.as_slice())
    }

    /// Number of conductor surfaces after slit fragmentation.
    ///
    /// # Errors
    ///
    /// Propagates winding validation errors.
    pub fn surface_count(&self) -> Result<usize> {
        Ok(self.slices()?.len() * (self.slit_radii().len() + 1))
    }

    /// Ordered conductor names: the plate name itself when one surface,
    /// otherwise `B1`..`Bn`.
    ///
    /// # Errors
    ///
    /// Propagates winding validation errors.
    pub fn solid_names(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        let count = self.surface_count()?;
        if count == 1 {
            return Ok(vec![prefix.unwrap_or(&self.name).to_owned()]);
        }
        Ok((1..=count)
            .map(|i| match prefix {
                Some(p) => format!("{p}_B{i}"),
                None => format!("B{i}"),
            })
            .collect())
    }

    /// Default characteristic length for this plate.
    #[must_use]
    pub fn lc(&self) -> f64 {
        (self.r[1] - self.r[0]) / 3.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn plate(slits: &[f64]) -> Plate {
        Plate {
            name: "Bint".into(),
            r: [100.0, 150.0],
            z: [-50.0, 50.0],
            axi: Axi {
                h: 50.0,
                turns: vec![1.0],
                pitch: vec![100.0],
            },
            cooling_slits: (!slits.is_empty()).then(|| CoolingSlits {
                radii: slits.to_vec(),
                width: None,
            }),
            tierod: None,
            sector_slits: Vec::new(),
        }
    }

    #[test]
    fn single_surface_keeps_the_plate_name() {
        let p = plate(&[]);
        assert_eq!(p.solid_names(None).unwrap(), vec!["Bint"]);
        assert_eq!(p.solid_names(Some("M1")).unwrap(), vec!["M1"]);
    }

    #[test]
    fn slit_plate_enumerates_fragments() {
        let p = plate(&[120.0, 130.0]);
        assert_eq!(p.surface_count().unwrap(), 3);
        assert_eq!(p.solid_names(None).unwrap(), vec!["B1", "B2", "B3"]);
        assert_eq!(
            p.solid_names(Some("M1")).unwrap(),
            vec!["M1_B1", "M1_B2", "M1_B3"]
        );
    }
}
