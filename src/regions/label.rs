//! Structured physical-group names.
//!
//! Region names are built from typed parts and only rendered to strings at
//! the kernel boundary, so downstream tools never have to parse name text to
//! recover what a group is.

use std::fmt;

/// Boundary classes resolved by bounding-box queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// High-pressure (lower) axial face.
    Hp,
    /// Low-pressure (upper) axial face.
    Bp,
    /// Inner radial face.
    RInt,
    /// Outer radial face.
    RExt,
    /// Ring inner-radius face on the slit side.
    R0n,
    /// Ring outer-radius face on the slit side.
    R1n,
    /// Union of a ring's cooling-slit curves.
    CoolingSlits,
}

impl Boundary {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hp => "HP",
            Self::Bp => "BP",
            Self::RInt => "Rint",
            Self::RExt => "Rext",
            Self::R0n => "R0n",
            Self::R1n => "R1n",
            Self::CoolingSlits => "CoolingSlits",
        }
    }
}

/// The typed payload of a region name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Stem {
    /// A conductor or structural solid, named by the geometry oracle.
    Solid(String),
    /// A cooling-slit curve set; numbering starts at 1.
    Slit(u32),
    /// A boundary face class.
    Boundary(Boundary),
    /// An aggregated cooling channel; numbering starts at 0.
    Channel(u32),
    /// The surrounding air surface.
    Air,
    /// The symmetry-axis boundary of the air box.
    ZAxis,
    /// The far-field boundary of the air box.
    Infinity,
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solid(name) => write!(f, "{name}"),
            Self::Slit(i) => write!(f, "Slit{i}"),
            Self::Boundary(b) => write!(f, "{}", b.as_str()),
            Self::Channel(i) => write!(f, "Channel{i}"),
            Self::Air => write!(f, "Air"),
            Self::ZAxis => write!(f, "ZAxis"),
            Self::Infinity => write!(f, "Infty"),
        }
    }
}

/// A complete region name: an optional owner prefix plus a stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    pub prefix: Option<String>,
    pub stem: Stem,
}

impl Label {
    #[must_use]
    pub fn new(prefix: Option<&str>, stem: Stem) -> Self {
        Self {
            prefix: prefix.map(str::to_owned),
            stem,
        }
    }

    #[must_use]
    pub fn solid(name: impl Into<String>) -> Self {
        Self {
            prefix: None,
            stem: Stem::Solid(name.into()),
        }
    }

    #[must_use]
    pub fn boundary(prefix: &str, boundary: Boundary) -> Self {
        Self::new(Some(prefix), Stem::Boundary(boundary))
    }

    #[must_use]
    pub fn bare(stem: Stem) -> Self {
        Self { prefix: None, stem }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(p) => write!(f, "{p}_{}", self.stem),
            None => write!(f, "{}", self.stem),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendering_matches_downstream_conventions() {
        assert_eq!(Label::boundary("Bitter", Boundary::Hp).to_string(), "Bitter_HP");
        assert_eq!(
            Label::boundary("Bitter", Boundary::RInt).to_string(),
            "Bitter_Rint"
        );
        assert_eq!(Label::bare(Stem::Slit(1)).to_string(), "Slit1");
        assert_eq!(Label::bare(Stem::Channel(0)).to_string(), "Channel0");
        assert_eq!(Label::bare(Stem::Infinity).to_string(), "Infty");
        assert_eq!(Label::solid("B2").to_string(), "B2");
        assert_eq!(
            Label::new(Some("Insert"), Stem::Channel(3)).to_string(),
            "Insert_Channel3"
        );
    }
}
