//! Plate pipeline: slit booleans, conductor naming, boundary regions.

use tracing::info;

use crate::builder;
use crate::error::{ReconcileError, Result};
use crate::fragment::{reconcile, BooleanKind, ShapeGroup};
use crate::geometry::Plate;
use crate::kernel::{Dim, EntityRef, Kernel, Session};
use crate::math::Box2;
use crate::regions::{Boundary, Label, RegionSpec, Stem};

use super::Accumulator;

/// How the cooling slits were realized during staging.
enum SlitTools {
    None,
    /// Zero-width slits: the realized curve fragments, one list per slit.
    Lines(Vec<Vec<EntityRef>>),
    /// Thick slits: `(radius, width)` per slit, resolved later by box query.
    Rects(Vec<(f64, f64)>),
}

pub(super) struct StagedPlate {
    pub(super) groups: Vec<ShapeGroup>,
    slits: SlitTools,
}

pub(super) fn stage<K: Kernel>(
    session: &mut Session<K>,
    plate: &Plate,
    prefix: Option<&str>,
    thick_slits: bool,
) -> Result<StagedPlate> {
    let mut slice_groups = builder::plate::build(session, plate)?;
    let radii = plate.slit_radii().to_vec();
    let width = plate
        .cooling_slits
        .as_ref()
        .and_then(|s| s.width)
        .filter(|_| thick_slits);

    let slits = if radii.is_empty() {
        SlitTools::None
    } else if let Some(w) = width {
        let tools: Vec<EntityRef> = builder::plate::slit_rects(session, plate, w)
            .into_iter()
            .map(|(_, tool)| tool)
            .collect();
        reconcile(session, &mut slice_groups, &tools, BooleanKind::Cut)?;
        SlitTools::Rects(radii.iter().map(|&r| (r, w)).collect())
    } else {
        let tools = builder::plate::slit_lines(session, plate);
        let fragments = reconcile(session, &mut slice_groups, &tools, BooleanKind::Fragment)?;
        SlitTools::Lines(fragments)
    };

    // conductor identity follows the naming oracle: one bare name for a
    // single surface, B1..Bn otherwise. A count mismatch means a slit did
    // not split its slice (a line on the domain boundary is the usual
    // culprit) and every downstream label would be wrong.
    let names = plate.solid_names(prefix)?;
    let surfaces: Vec<EntityRef> = slice_groups
        .iter()
        .flat_map(|g| g.entities.iter().copied())
        .collect();
    if names.len() != surfaces.len() {
        return Err(ReconcileError::NameCountMismatch {
            part: plate.name.clone(),
            expected: names.len(),
            got: surfaces.len(),
        }
        .into());
    }
    let groups = names
        .into_iter()
        .zip(surfaces)
        .map(|(name, surface)| ShapeGroup::new(name, vec![surface]))
        .collect();
    Ok(StagedPlate { groups, slits })
}

pub(super) fn register<K: Kernel>(
    session: &mut Session<K>,
    acc: &mut Accumulator,
    staged: &StagedPlate,
    plate: &Plate,
    prefix: Option<&str>,
) -> Result<()> {
    for group in &staged.groups {
        acc.registry.register(
            session,
            Label::solid(group.name.clone()),
            Dim::Surface,
            RegionSpec::verbatim(group.entities.clone()),
        )?;
        acc.lcs.push((group.name.clone(), plate.lc()));
    }

    match &staged.slits {
        SlitTools::None => {}
        SlitTools::Lines(per_slit) => {
            for (i, curves) in (1u32..).zip(per_slit) {
                let label = Label::new(prefix, Stem::Slit(i));
                acc.lcs.push((label.to_string(), plate.lc()));
                acc.registry.register(
                    session,
                    label,
                    Dim::Curve,
                    RegionSpec::verbatim(curves.clone()),
                )?;
            }
        }
        SlitTools::Rects(slits) => {
            for (i, (r, w)) in (1u32..).zip(slits) {
                let label = Label::new(prefix, Stem::Slit(i));
                let band = Box2::new(r - w / 2.0, plate.z[0], r + w / 2.0, plate.z[1]);
                acc.lcs.push((label.to_string(), plate.lc()));
                acc.registry
                    .register(session, label, Dim::Curve, RegionSpec::boxes(vec![band]))?;
            }
        }
    }

    let [r0, r1] = plate.r;
    let [z0, z1] = plate.z;
    let faces = [
        (Boundary::Hp, Box2::new(r0, z0, r1, z0)),
        (Boundary::Bp, Box2::new(r0, z1, r1, z1)),
        (Boundary::RInt, Box2::new(r0, z0, r0, z1)),
        (Boundary::RExt, Box2::new(r1, z0, r1, z1)),
    ];
    for (boundary, extent) in faces {
        acc.registry.register(
            session,
            Label::new(prefix, Stem::Boundary(boundary)),
            Dim::Curve,
            RegionSpec::boxes(vec![extent]),
        )?;
    }
    info!(plate = %plate.name, regions = acc.registry.len(), "plate registered");
    Ok(())
}
