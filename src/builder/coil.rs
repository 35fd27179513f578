//! Coil primitives: slice rectangles with chamfered ends.

use crate::error::{ReconcileError, Result};
use crate::fragment::ShapeGroup;
use crate::geometry::{Chamfer, Coil, RSide, Side};
use crate::kernel::{EntityRef, Kernel, Session};
use crate::math::Point2;

/// Triangular cutting polygon for one chamfer at a coil corner.
fn chamfer_polygon(coil: &Coil, chamfer: &Chamfer) -> Vec<Point2> {
    let cr = chamfer.radius();
    let l = chamfer.length;
    match (chamfer.side, chamfer.rside) {
        (Side::Hp, RSide::Rint) => {
            let (r, z) = (coil.r[0], coil.z[0]);
            vec![
                Point2::new(r, z),
                Point2::new(r, z + l),
                Point2::new(r + cr, z),
            ]
        }
        (Side::Hp, RSide::Rext) => {
            let (r, z) = (coil.r[1], coil.z[0]);
            vec![
                Point2::new(r, z),
                Point2::new(r - cr, z),
                Point2::new(r, z + l),
            ]
        }
        (Side::Bp, RSide::Rint) => {
            let (r, z) = (coil.r[0], coil.z[1]);
            vec![
                Point2::new(r, z),
                Point2::new(r + cr, z),
                Point2::new(r, z - l),
            ]
        }
        (Side::Bp, RSide::Rext) => {
            let (r, z) = (coil.r[1], coil.z[1]);
            vec![
                Point2::new(r, z),
                Point2::new(r, z - l),
                Point2::new(r - cr, z),
            ]
        }
    }
}

/// Cuts one chamfer out of an end slice. Chamfer cuts always leave exactly
/// one surface, so no group bookkeeping is needed.
fn apply_chamfer<K: Kernel>(
    session: &mut Session<K>,
    surface: EntityRef,
    coil: &Coil,
    chamfer: &Chamfer,
) -> Result<EntityRef> {
    let tool = session.add_polygon(&chamfer_polygon(coil, chamfer));
    let outcome = session.cut(&[surface], &[tool])?;
    outcome
        .descendants
        .first()
        .and_then(|kids| kids.first())
        .copied()
        .ok_or_else(|| {
            ReconcileError::EmptyDescendants {
                role: "domain group",
                index: 0,
                dim: 2,
                op: "cut",
            }
            .into()
        })
}

/// Stages one rectangle per slice, chamfering the bottom slice with the HP
/// chamfers and the top slice with the BP chamfers.
///
/// # Errors
///
/// Winding validation errors, or a reconcile error if a chamfer cut consumes
/// its slice.
pub fn build<K: Kernel>(session: &mut Session<K>, coil: &Coil) -> Result<Vec<ShapeGroup>> {
    let x = coil.r[0];
    let dr = coil.r[1] - coil.r[0];
    let slices = coil.slices()?;
    let last = slices.len() - 1;

    let mut groups = Vec::with_capacity(slices.len());
    for (i, slice) in slices.iter().enumerate() {
        let mut surface = session.add_rectangle(x, slice.z0, dr, slice.dz);
        let side = if i == 0 {
            Some(Side::Hp)
        } else if i == last {
            Some(Side::Bp)
        } else {
            None
        };
        if let Some(side) = side {
            for chamfer in coil.chamfers.iter().filter(|c| c.side == side) {
                surface = apply_chamfer(session, surface, coil, chamfer)?;
            }
        }
        groups.push(ShapeGroup::new(
            format!("{}_slice{i}", coil.name),
            vec![surface],
        ));
    }
    Ok(groups)
}
