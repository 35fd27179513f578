//! Read-only geometry descriptions.
//!
//! These records describe one magnet each: radii, axial extents, winding
//! model, cooling features. They are loaded from YAML, validated once, and
//! never mutated by the build pipeline. Each kind also acts as the naming
//! oracle: `solid_names` returns the ordered list of conductor names the
//! pipeline must reproduce.

pub mod coil;
pub mod insert;
pub mod plate;
pub mod ring;
pub mod site;
pub mod stack;

pub use coil::Coil;
pub use insert::Insert;
pub use plate::Plate;
pub use ring::Ring;
pub use site::Site;
pub use stack::{Detail, Stack};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpecError};
use crate::math::TOLERANCE;

/// Axial winding model: turn counts and pitches, with the stack starting at
/// `z = -h`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axi {
    pub h: f64,
    pub turns: Vec<f64>,
    pub pitch: Vec<f64>,
}

/// One axial slice of a winding: a full turn block or a stub filling the gap
/// between the turn stack and the requested extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slice {
    pub z0: f64,
    pub dz: f64,
    pub stub: bool,
}

impl Axi {
    /// Slices the winding over the requested axial extent `z = [zmin, zmax]`.
    ///
    /// A stub slice is prepended/appended when the requested extent exceeds
    /// the turn stack by at least the geometric tolerance; an extent that
    /// ends strictly inside the stack is a contract violation.
    ///
    /// # Errors
    ///
    /// [`SpecError::MismatchedTurnPitch`], [`SpecError::ZeroAreaSlice`] or
    /// [`SpecError::StubInsideStack`].
    pub fn slices(&self, z: [f64; 2]) -> Result<Vec<Slice>> {
        if self.turns.len() != self.pitch.len() {
            return Err(SpecError::MismatchedTurnPitch {
                turns: self.turns.len(),
                pitches: self.pitch.len(),
            }
            .into());
        }

        let mut slices = Vec::with_capacity(self.turns.len() + 2);
        let stack_lo = -self.h;

        if z[0] < stack_lo - TOLERANCE {
            slices.push(Slice {
                z0: z[0],
                dz: stack_lo - z[0],
                stub: true,
            });
        } else if z[0] > stack_lo + TOLERANCE {
            return Err(SpecError::StubInsideStack {
                z_request: z[0],
                z_stack: stack_lo,
            }
            .into());
        }

        let mut y = stack_lo;
        for (n, pitch) in self.turns.iter().zip(&self.pitch) {
            let dz = n * pitch;
            if dz <= TOLERANCE {
                return Err(SpecError::ZeroAreaSlice { z: y }.into());
            }
            slices.push(Slice {
                z0: y,
                dz,
                stub: false,
            });
            y += dz;
        }

        if z[1] > y + TOLERANCE {
            slices.push(Slice {
                z0: y,
                dz: z[1] - y,
                stub: true,
            });
        } else if z[1] < y - TOLERANCE {
            return Err(SpecError::StubInsideStack {
                z_request: z[1],
                z_stack: y,
            }
            .into());
        }

        Ok(slices)
    }

    /// Axial height of the turn stack alone.
    #[must_use]
    pub fn stack_height(&self) -> f64 {
        self.turns.iter().zip(&self.pitch).map(|(n, p)| n * p).sum()
    }
}

/// Radial cooling-slit positions of a plate; `width` enables finite-thickness
/// modeling under the cut operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoolingSlits {
    pub radii: Vec<f64>,
    #[serde(default)]
    pub width: Option<f64>,
}

/// Axial side of a coil end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Hp,
    Bp,
}

/// Radial side of a coil end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RSide {
    Rint,
    Rext,
}

/// A chamfer on one corner of a coil profile. `alpha` is in degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chamfer {
    pub side: Side,
    pub rside: RSide,
    pub alpha: f64,
    pub length: f64,
}

impl Chamfer {
    /// Radial reach of the chamfer.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.length * self.alpha.to_radians().tan()
    }
}

/// A closed polyline profile, offset radially when instantiated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape2d {
    pub pts: Vec<[f64; 2]>,
}

/// Tie-rod layout for full 2D sector models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TieRod {
    pub n: u32,
    pub r: f64,
    pub shape: Shape2d,
}

/// An angular slit pattern for full 2D sector models. `angle` is in degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorSlit {
    pub n: u32,
    pub r: f64,
    #[serde(default)]
    pub angle: f64,
    pub shape: Shape2d,
}

/// The supported magnet kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Magnet {
    Plate(Plate),
    Coil(Coil),
    Stack(Stack),
    Ring(Ring),
    Insert(Insert),
    Site(Site),
}

impl Magnet {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Plate(p) => &p.name,
            Self::Coil(c) => &c.name,
            Self::Stack(s) => &s.name,
            Self::Ring(r) => &r.name,
            Self::Insert(i) => &i.name,
            Self::Site(s) => &s.name,
        }
    }

    /// Radial/axial bounding extents `([rmin, rmax], [zmin, zmax])`.
    #[must_use]
    pub fn bounding_extents(&self) -> ([f64; 2], [f64; 2]) {
        match self {
            Self::Plate(p) => (p.r, p.z),
            Self::Coil(c) => (c.r, c.z),
            Self::Stack(s) => (s.r, s.z),
            Self::Ring(r) => ([r.r[0], r.r[3]], r.z),
            Self::Insert(i) => i.bounding_extents(),
            Self::Site(s) => s.bounding_extents(),
        }
    }
}

/// Loads a magnet description from a YAML file.
///
/// # Errors
///
/// [`SpecError::Io`] if the file cannot be read, [`SpecError::Parse`] if it
/// is not a valid description.
pub fn load(path: &Path) -> Result<Magnet> {
    let text = std::fs::read_to_string(path).map_err(|source| SpecError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let magnet = serde_yaml::from_str(&text).map_err(|source| SpecError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    Ok(magnet)
}
