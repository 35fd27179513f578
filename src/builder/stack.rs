//! Stack primitives: recursive double-pancake decomposition.
//!
//! The shape tree mirrors the requested detail level exactly; each variant
//! carries named groups so later stages can flatten without re-deriving the
//! structure.

use crate::error::Result;
use crate::fragment::ShapeGroup;
use crate::geometry::stack::{DoublePancake, Pancake, Structure};
use crate::geometry::{Detail, Stack};
use crate::kernel::{Kernel, Session};

/// One tape layer pair: superconductor strip plus glue.
#[derive(Debug, Clone)]
pub struct TapeShapes {
    pub sc: ShapeGroup,
    pub glue: ShapeGroup,
}

/// A pancake, whole or decomposed into mandrin and tapes.
#[derive(Debug, Clone)]
pub enum PancakeShapes {
    Whole(ShapeGroup),
    Tapes {
        mandrin: ShapeGroup,
        tapes: Vec<TapeShapes>,
    },
}

/// A double pancake, whole or split into two pancakes around the internal
/// isolation.
#[derive(Debug, Clone)]
pub enum DblShapes {
    Whole(ShapeGroup),
    Split {
        p0: PancakeShapes,
        p1: PancakeShapes,
        internal: ShapeGroup,
    },
}

/// The staged shape tree of one stack.
#[derive(Debug, Clone)]
pub enum StackShapes {
    Aggregate(ShapeGroup),
    Detailed {
        dblpancakes: Vec<DblShapes>,
        isolations: Vec<ShapeGroup>,
    },
}

impl StackShapes {
    /// Flattens the tree into groups, in the same order as
    /// [`Stack::solid_names`].
    #[must_use]
    pub fn flatten(&self) -> Vec<ShapeGroup> {
        match self {
            Self::Aggregate(group) => vec![group.clone()],
            Self::Detailed {
                dblpancakes,
                isolations,
            } => {
                let mut groups = Vec::new();
                for dp in dblpancakes {
                    match dp {
                        DblShapes::Whole(g) => groups.push(g.clone()),
                        DblShapes::Split { p0, p1, internal } => {
                            for p in [p0, p1] {
                                match p {
                                    PancakeShapes::Whole(g) => groups.push(g.clone()),
                                    PancakeShapes::Tapes { mandrin, tapes } => {
                                        groups.push(mandrin.clone());
                                        for t in tapes {
                                            groups.push(t.sc.clone());
                                            groups.push(t.glue.clone());
                                        }
                                    }
                                }
                            }
                            groups.push(internal.clone());
                        }
                    }
                }
                groups.extend(isolations.iter().cloned());
                groups
            }
        }
    }

    /// Writes the flattened groups back into the tree, in the same order.
    /// The input must hold exactly as many groups as [`Self::flatten`]
    /// returns.
    pub fn unflatten(&mut self, groups: Vec<ShapeGroup>) {
        let mut iter = groups.into_iter();
        let mut next = || {
            let group = iter.next();
            debug_assert!(group.is_some(), "unflatten: fewer groups than the tree holds");
            group.unwrap_or_else(|| ShapeGroup::new("", vec![]))
        };
        match self {
            Self::Aggregate(group) => *group = next(),
            Self::Detailed {
                dblpancakes,
                isolations,
            } => {
                for dp in dblpancakes.iter_mut() {
                    match dp {
                        DblShapes::Whole(g) => *g = next(),
                        DblShapes::Split { p0, p1, internal } => {
                            for p in [&mut *p0, &mut *p1] {
                                match p {
                                    PancakeShapes::Whole(g) => *g = next(),
                                    PancakeShapes::Tapes { mandrin, tapes } => {
                                        *mandrin = next();
                                        for t in tapes.iter_mut() {
                                            t.sc = next();
                                            t.glue = next();
                                        }
                                    }
                                }
                            }
                            *internal = next();
                        }
                    }
                }
                for iso in isolations.iter_mut() {
                    *iso = next();
                }
            }
        }
        drop(next);
        debug_assert!(
            iter.next().is_none(),
            "unflatten: more groups than the tree holds"
        );
    }
}

fn pancake_shapes<K: Kernel>(
    session: &mut Session<K>,
    pancake: &Pancake,
    y0: f64,
    detail: Detail,
    base: &str,
) -> PancakeShapes {
    if detail == Detail::Pancake {
        let rect = session.add_rectangle(pancake.r0, y0, pancake.width(), pancake.height());
        return PancakeShapes::Whole(ShapeGroup::new(base, vec![rect]));
    }
    let mandrin = session.add_rectangle(
        pancake.r0 - pancake.mandrin,
        y0,
        pancake.mandrin,
        pancake.height(),
    );
    let mut tapes = Vec::with_capacity(pancake.n);
    let mut x = pancake.r0;
    for t in 0..pancake.n {
        let sc = session.add_rectangle(x, y0, pancake.tape.w, pancake.tape.h);
        let glue = session.add_rectangle(x + pancake.tape.w, y0, pancake.tape.e, pancake.tape.h);
        tapes.push(TapeShapes {
            sc: ShapeGroup::new(format!("{base}_t{t}_SC"), vec![sc]),
            glue: ShapeGroup::new(format!("{base}_t{t}_Duromag"), vec![glue]),
        });
        x += pancake.tape.width();
    }
    PancakeShapes::Tapes {
        mandrin: ShapeGroup::new(format!("{base}_Mandrin"), vec![mandrin]),
        tapes,
    }
}

fn dblpancake_shapes<K: Kernel>(
    session: &mut Session<K>,
    dp: &DoublePancake,
    y0: f64,
    detail: Detail,
    base: &str,
) -> DblShapes {
    if detail == Detail::DblPancake {
        let rect =
            session.add_rectangle(dp.pancake.r0, y0, dp.pancake.width(), dp.height());
        return DblShapes::Whole(ShapeGroup::new(base, vec![rect]));
    }
    let p0 = pancake_shapes(session, &dp.pancake, y0, detail, &format!("{base}_p0"));
    let mut y = y0 + dp.pancake.height();
    let internal = session.add_rectangle(dp.isolation.r0, y, dp.isolation.w, dp.isolation.h);
    y += dp.isolation.h;
    let p1 = pancake_shapes(session, &dp.pancake, y, detail, &format!("{base}_p1"));
    DblShapes::Split {
        p0,
        p1,
        internal: ShapeGroup::new(format!("{base}_i"), vec![internal]),
    }
}

/// Stages the whole stack, bottom-up from `z` center minus half the
/// structure height.
///
/// # Errors
///
/// [`crate::error::SpecError::MissingStructure`] for a detailed stack
/// without a winding structure.
pub fn build<K: Kernel>(
    session: &mut Session<K>,
    stack: &Stack,
    prefix: Option<&str>,
) -> Result<StackShapes> {
    let base = match prefix {
        Some(p) => format!("{p}_{}", stack.name),
        None => stack.name.clone(),
    };

    if stack.detail == Detail::None {
        let rect = session.add_rectangle(
            stack.r[0],
            stack.z[0],
            stack.r[1] - stack.r[0],
            stack.z[1] - stack.z[0],
        );
        return Ok(StackShapes::Aggregate(ShapeGroup::new(base, vec![rect])));
    }

    let structure: &Structure = stack.require_structure()?;
    let center = (stack.z[0] + stack.z[1]) / 2.0;
    let mut y = center - structure.height() / 2.0;

    let n_dp = structure.dblpancakes.len();
    let mut dblpancakes = Vec::with_capacity(n_dp);
    let mut isolations = Vec::with_capacity(n_dp.saturating_sub(1));
    for (i, dp) in structure.dblpancakes.iter().enumerate() {
        let shapes = dblpancake_shapes(session, dp, y, stack.detail, &format!("{base}_dp{i}"));
        dblpancakes.push(shapes);
        y += dp.height();
        if i != n_dp - 1 {
            if let Some(iso) = structure.isolations.get(i) {
                let rect = session.add_rectangle(iso.r0, y, iso.w, iso.h);
                isolations.push(ShapeGroup::new(format!("{base}_i{i}"), vec![rect]));
                y += iso.h;
            }
        }
    }

    Ok(StackShapes::Detailed {
        dblpancakes,
        isolations,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::stack::{Isolation, Tape};
    use crate::kernel::PlanarKernel;

    fn stack(detail: Detail) -> Stack {
        let pancake = Pancake {
            r0: 10.0,
            mandrin: 1.0,
            tape: Tape {
                w: 0.2,
                h: 12.0,
                e: 0.05,
            },
            n: 4,
        };
        let internal = Isolation {
            r0: 10.0,
            w: pancake.width(),
            h: 0.5,
        };
        let structure = Structure {
            dblpancakes: vec![
                DoublePancake {
                    pancake: pancake.clone(),
                    isolation: internal.clone(),
                },
                DoublePancake {
                    pancake,
                    isolation: internal,
                },
            ],
            isolations: vec![Isolation {
                r0: 10.0,
                w: 1.0,
                h: 1.0,
            }],
        };
        Stack {
            name: "S1".into(),
            r: [10.0, 11.0],
            z: [-26.0, 26.0],
            detail,
            structure: Some(structure),
        }
    }

    #[test]
    fn flatten_matches_the_naming_oracle() {
        for detail in [Detail::None, Detail::DblPancake, Detail::Pancake, Detail::Tape] {
            let spec = {
                let mut s = stack(detail);
                s.detail = detail;
                s
            };
            let mut session = Session::new(PlanarKernel::new());
            let shapes = build(&mut session, &spec, None).unwrap();
            let groups = shapes.flatten();
            let names: Vec<String> = groups.iter().map(|g| g.name.clone()).collect();
            assert_eq!(names, spec.solid_names(None).unwrap(), "{detail:?}");
        }
    }

    #[test]
    fn unflatten_round_trips() {
        let spec = stack(Detail::Tape);
        let mut session = Session::new(PlanarKernel::new());
        let mut shapes = build(&mut session, &spec, None).unwrap();
        let mut groups = shapes.flatten();
        for g in &mut groups {
            g.entities.clear();
        }
        shapes.unflatten(groups.clone());
        let back = shapes.flatten();
        assert_eq!(back.len(), groups.len());
        assert!(back.iter().all(|g| g.entities.is_empty()));
    }

    #[test]
    #[should_panic(expected = "fewer groups than the tree holds")]
    fn unflatten_rejects_a_short_list() {
        let spec = stack(Detail::Tape);
        let mut session = Session::new(PlanarKernel::new());
        let mut shapes = build(&mut session, &spec, None).unwrap();
        let mut groups = shapes.flatten();
        groups.pop();
        shapes.unflatten(groups);
    }

    #[test]
    fn aggregate_stack_is_one_rectangle() {
        let spec = stack(Detail::None);
        let mut session = Session::new(PlanarKernel::new());
        let shapes = build(&mut session, &spec, None).unwrap();
        let groups = shapes.flatten();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "S1");
    }
}
