//! Superconducting stack magnet (HTS insert).
//!
//! A stack is a pile of double pancakes separated by isolation sheets; each
//! pancake is a mandrin plus a run of tapes, each tape a superconductor strip
//! plus its glue layer. The `Detail` level selects how deep the geometric
//! decomposition goes; names follow the decomposition verbatim.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpecError};

/// Decomposition granularity for a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Detail {
    None,
    DblPancake,
    Pancake,
    Tape,
}

/// One tape: superconductor width `w`, height `h`, glue width `e`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tape {
    pub w: f64,
    pub h: f64,
    pub e: f64,
}

impl Tape {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.w + self.e
    }
}

/// One pancake: a mandrin and `n` tapes wound from `r0` outward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pancake {
    pub r0: f64,
    pub mandrin: f64,
    pub tape: Tape,
    pub n: usize,
}

impl Pancake {
    #[must_use]
    pub fn width(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let n = self.n as f64;
        n * self.tape.width()
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.tape.h
    }

    #[must_use]
    pub fn r1(&self) -> f64 {
        self.r0 + self.width()
    }
}

/// An isolation sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Isolation {
    pub r0: f64,
    pub w: f64,
    pub h: f64,
}

/// Two identical pancakes around an internal isolation sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoublePancake {
    pub pancake: Pancake,
    pub isolation: Isolation,
}

impl DoublePancake {
    #[must_use]
    pub fn height(&self) -> f64 {
        2.0 * self.pancake.height() + self.isolation.h
    }
}

/// The winding structure of a stack: double pancakes and the isolation
/// sheets between consecutive ones (`isolations.len() == dblpancakes.len() - 1`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    pub dblpancakes: Vec<DoublePancake>,
    #[serde(default)]
    pub isolations: Vec<Isolation>,
}

impl Structure {
    #[must_use]
    pub fn height(&self) -> f64 {
        self.dblpancakes.iter().map(DoublePancake::height).sum::<f64>()
            + self.isolations.iter().map(|i| i.h).sum::<f64>()
    }
}

/// A superconducting stack magnet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stack {
    pub name: String,
    pub r: [f64; 2],
    pub z: [f64; 2],
    pub detail: Detail,
    #[serde(default)]
    pub structure: Option<Structure>,
}

impl Stack {
    /// The winding structure, required for any detail level beyond
    /// [`Detail::None`].
    ///
    /// # Errors
    ///
    /// [`SpecError::MissingStructure`] if the description omits it.
    pub fn require_structure(&self) -> Result<&Structure> {
        self.structure.as_ref().ok_or_else(|| {
            SpecError::MissingStructure {
                name: self.name.clone(),
                detail: format!("{:?}", self.detail),
            }
            .into()
        })
    }

    fn base(&self, prefix: Option<&str>) -> String {
        match prefix {
            Some(p) => format!("{p}_{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Ordered solid names for the selected detail level.
    ///
    /// # Errors
    ///
    /// [`SpecError::MissingStructure`] when the detail level needs a
    /// structure that is absent.
    pub fn solid_names(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        let base = self.base(prefix);
        match self.detail {
            Detail::None => Ok(vec![base]),
            Detail::DblPancake => {
                let s = self.require_structure()?;
                let n_dp = s.dblpancakes.len();
                let mut names: Vec<String> =
                    (0..n_dp).map(|i| format!("{base}_dp{i}")).collect();
                names.extend((0..n_dp.saturating_sub(1)).map(|i| format!("{base}_i{i}")));
                Ok(names)
            }
            Detail::Pancake => {
                let s = self.require_structure()?;
                let n_dp = s.dblpancakes.len();
                let mut names = Vec::new();
                for i in 0..n_dp {
                    names.push(format!("{base}_dp{i}_p0"));
                    names.push(format!("{base}_dp{i}_p1"));
                    names.push(format!("{base}_dp{i}_i"));
                }
                names.extend((0..n_dp.saturating_sub(1)).map(|i| format!("{base}_i{i}")));
                Ok(names)
            }
            Detail::Tape => {
                let s = self.require_structure()?;
                let mut names = Vec::new();
                for (i, dp) in s.dblpancakes.iter().enumerate() {
                    for p in 0..2 {
                        names.push(format!("{base}_dp{i}_p{p}_Mandrin"));
                        for t in 0..dp.pancake.n {
                            names.push(format!("{base}_dp{i}_p{p}_t{t}_SC"));
                            names.push(format!("{base}_dp{i}_p{p}_t{t}_Duromag"));
                        }
                    }
                    names.push(format!("{base}_dp{i}_i"));
                }
                names.extend(
                    (0..s.dblpancakes.len().saturating_sub(1)).map(|i| format!("{base}_i{i}")),
                );
                Ok(names)
            }
        }
    }

    #[must_use]
    pub fn lc(&self) -> f64 {
        (self.r[1] - self.r[0]) / 3.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn structure(n_dp: usize, n_tapes: usize) -> Structure {
        let pancake = Pancake {
            r0: 10.0,
            mandrin: 1.0,
            tape: Tape {
                w: 0.2,
                h: 12.0,
                e: 0.05,
            },
            n: n_tapes,
        };
        let internal = Isolation {
            r0: 10.0,
            w: pancake.width(),
            h: 0.5,
        };
        Structure {
            dblpancakes: (0..n_dp)
                .map(|_| DoublePancake {
                    pancake: pancake.clone(),
                    isolation: internal.clone(),
                })
                .collect(),
            isolations: (0..n_dp.saturating_sub(1))
                .map(|_| Isolation {
                    r0: 10.0,
                    w: pancake.width(),
                    h: 1.0,
                })
                .collect(),
        }
    }

    fn stack(detail: Detail, structure: Option<Structure>) -> Stack {
        Stack {
            name: "S1".into(),
            r: [10.0, 16.0],
            z: [-40.0, 40.0],
            detail,
            structure,
        }
    }

    #[test]
    fn aggregate_stack_has_one_name() {
        let s = stack(Detail::None, Some(structure(2, 3)));
        assert_eq!(s.solid_names(None).unwrap(), vec!["S1"]);
    }

    #[test]
    fn dblpancake_names_interleave_isolations() {
        let s = stack(Detail::DblPancake, Some(structure(3, 3)));
        assert_eq!(
            s.solid_names(None).unwrap(),
            vec!["S1_dp0", "S1_dp1", "S1_dp2", "S1_i0", "S1_i1"]
        );
    }

    #[test]
    fn pancake_names_split_each_dblpancake() {
        let s = stack(Detail::Pancake, Some(structure(2, 3)));
        let names = s.solid_names(Some("M")).unwrap();
        assert_eq!(names.len(), 2 * 3 + 1);
        assert_eq!(names[0], "M_S1_dp0_p0");
        assert_eq!(names[2], "M_S1_dp0_i");
        assert_eq!(names[6], "M_S1_i0");
    }

    #[test]
    fn tape_names_enumerate_every_layer() {
        let s = stack(Detail::Tape, Some(structure(2, 2)));
        let names = s.solid_names(None).unwrap();
        // per dp: 2 pancakes x (1 mandrin + 2 tapes x 2 layers) + 1 internal
        // isolation, plus 1 inter-dp isolation
        assert_eq!(names.len(), 2 * (2 * 5 + 1) + 1);
        assert!(names.contains(&"S1_dp1_p0_t1_Duromag".to_owned()));
        assert!(names.contains(&"S1_dp0_p1_t0_SC".to_owned()));
    }

    #[test]
    fn detailed_stack_without_structure_is_rejected() {
        let s = stack(Detail::Pancake, None);
        assert!(matches!(
            s.solid_names(None).unwrap_err(),
            crate::MagmeshError::Spec(SpecError::MissingStructure { .. })
        ));
    }
}
