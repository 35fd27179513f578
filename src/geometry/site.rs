//! Multi-magnet site.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpecError};

use super::Magnet;

/// An ordered collection of magnets built into one model. Order matters:
/// later members depend on the kernel tag space of earlier ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    pub magnets: Vec<Magnet>,
}

impl Site {
    /// Rejects nested sites before any kernel call is made.
    ///
    /// # Errors
    ///
    /// [`SpecError::UnsupportedMagnet`] for a site inside a site.
    pub fn validate(&self) -> Result<()> {
        for magnet in &self.magnets {
            if let Magnet::Site(inner) = magnet {
                return Err(SpecError::UnsupportedMagnet(format!(
                    "nested site {} inside {}",
                    inner.name, self.name
                ))
                .into());
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn bounding_extents(&self) -> ([f64; 2], [f64; 2]) {
        let mut r = [f64::INFINITY, f64::NEG_INFINITY];
        let mut z = [f64::INFINITY, f64::NEG_INFINITY];
        for magnet in &self.magnets {
            let (mr, mz) = magnet.bounding_extents();
            r[0] = r[0].min(mr[0]);
            r[1] = r[1].max(mr[1]);
            z[0] = z[0].min(mz[0]);
            z[1] = z[1].max(mz[1]);
        }
        (r, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Axi, Plate};

    fn plate(name: &str, r: [f64; 2]) -> Magnet {
        Magnet::Plate(Plate {
            name: name.into(),
            r,
            z: [-50.0, 50.0],
            axi: Axi {
                h: 50.0,
                turns: vec![1.0],
                pitch: vec![100.0],
            },
            cooling_slits: None,
            tierod: None,
            sector_slits: Vec::new(),
        })
    }

    #[test]
    fn extents_cover_all_members() {
        let site = Site {
            name: "M9".into(),
            magnets: vec![plate("Bint", [100.0, 150.0]), plate("Bext", [200.0, 300.0])],
        };
        let (r, z) = site.bounding_extents();
        assert_eq!(r, [100.0, 300.0]);
        assert_eq!(z, [-50.0, 50.0]);
        assert!(site.validate().is_ok());
    }

    #[test]
    fn nested_site_is_rejected() {
        let inner = Site {
            name: "inner".into(),
            magnets: vec![],
        };
        let site = Site {
            name: "outer".into(),
            magnets: vec![Magnet::Site(inner)],
        };
        assert!(site.validate().is_err());
    }
}
