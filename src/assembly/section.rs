//! Full 2D cross-section of a plate.
//!
//! Instead of the axisymmetric (r, z) profile, this view builds one angular
//! sector in the (x, y) plane, cuts the tie rod and angular slit shapes out
//! of it, and replicates the result around the axis.

use std::f64::consts::TAU;

use crate::error::Result;
use crate::fragment::{reconcile, BooleanKind, ShapeGroup};
use crate::geometry::{Plate, Shape2d};
use crate::kernel::{Kernel, Session};
use crate::math::Point2;

const ARC_STEPS: usize = 24;

fn arc_points(r: f64, a0: f64, a1: f64, out: &mut Vec<Point2>) {
    for s in 0..=ARC_STEPS {
        #[allow(clippy::cast_precision_loss)]
        let t = a0 + (a1 - a0) * s as f64 / ARC_STEPS as f64;
        out.push(Point2::new(r * t.cos(), r * t.sin()));
    }
}

/// Instantiates a profile at radius `r`, rotated by `angle` around the axis.
fn shape_at(shape: &Shape2d, r: f64, angle: f64) -> Vec<Point2> {
    let (sin, cos) = angle.sin_cos();
    shape
        .pts
        .iter()
        .map(|[x, y]| {
            let (px, py) = (x + r, *y);
            Point2::new(px * cos - py * sin, px * sin + py * cos)
        })
        .collect()
}

/// Stages the sector pattern. Sector 1 straddles the positive x axis; the
/// remaining `n - 1` sectors are rotated copies of its cut result.
pub fn stage<K: Kernel>(
    session: &mut Session<K>,
    plate: &Plate,
    base: &str,
) -> Result<Vec<ShapeGroup>> {
    let n = plate.tierod.as_ref().map_or(1, |t| t.n.max(1));
    let theta = TAU / f64::from(n);
    let half = theta / 2.0;

    let mut pts = Vec::with_capacity(2 * (ARC_STEPS + 1));
    arc_points(plate.r[1], -half, half, &mut pts);
    arc_points(plate.r[0], half, -half, &mut pts);
    let sector = session.add_polygon(&pts);

    let mut tools = Vec::new();
    if let Some(tierod) = &plate.tierod {
        tools.push(session.add_polygon(&shape_at(&tierod.shape, tierod.r, 0.0)));
    }
    for slit in &plate.sector_slits {
        let count = slit.n.max(1);
        let per = theta / f64::from(count);
        for k in 0..count {
            let angle =
                slit.angle.to_radians() + (f64::from(k) - f64::from(count - 1) / 2.0) * per;
            tools.push(session.add_polygon(&shape_at(&slit.shape, slit.r, angle)));
        }
    }

    let mut groups = vec![ShapeGroup::new(format!("{base}_S1"), vec![sector])];
    if !tools.is_empty() {
        reconcile(session, &mut groups, &tools, BooleanKind::Cut)?;
    }

    let first = groups[0].entities.clone();
    for k in 1..n {
        let mut copies = Vec::with_capacity(first.len());
        for e in &first {
            copies.push(session.copy(*e)?);
        }
        session.rotate(&copies, f64::from(k) * theta)?;
        groups.push(ShapeGroup::new(format!("{base}_S{}", k + 1), copies));
    }
    Ok(groups)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Axi, TieRod};
    use crate::kernel::PlanarKernel;

    #[test]
    fn tie_rod_pattern_replicates_per_sector() {
        let plate = Plate {
            name: "Bi".into(),
            r: [100.0, 200.0],
            z: [-50.0, 50.0],
            axi: Axi {
                h: 50.0,
                turns: vec![1.0],
                pitch: vec![100.0],
            },
            cooling_slits: None,
            tierod: Some(TieRod {
                n: 4,
                r: 150.0,
                shape: Shape2d {
                    pts: vec![[-5.0, -5.0], [5.0, -5.0], [5.0, 5.0], [-5.0, 5.0]],
                },
            }),
            sector_slits: Vec::new(),
        };
        let mut s = Session::new(PlanarKernel::new());
        let groups = stage(&mut s, &plate, "Bi").unwrap();
        assert_eq!(groups.len(), 4);
        assert_eq!(groups[0].name, "Bi_S1");
        assert_eq!(groups[3].name, "Bi_S4");
        for g in &groups {
            assert!(!g.entities.is_empty());
        }
    }
}
