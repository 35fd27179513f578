//! Coil pipeline: chamfered slices plus boundary regions.

use crate::builder;
use crate::error::Result;
use crate::fragment::ShapeGroup;
use crate::geometry::Coil;
use crate::kernel::{Dim, Kernel, Session};
use crate::math::Box2;
use crate::regions::{Boundary, Label, RegionSpec, Stem};

use super::Accumulator;

pub(super) struct StagedCoil {
    pub(super) groups: Vec<ShapeGroup>,
}

pub(super) fn stage<K: Kernel>(
    session: &mut Session<K>,
    coil: &Coil,
    prefix: Option<&str>,
) -> Result<StagedCoil> {
    let mut groups = builder::coil::build(session, coil)?;
    for (group, name) in groups.iter_mut().zip(coil.solid_names(prefix)?) {
        group.name = name;
    }
    Ok(StagedCoil { groups })
}

/// Registers the coil's regions. `ends` controls whether the HP/BP axial
/// faces are exposed; an insert suppresses them for interior coils it caps
/// with rings.
pub(super) fn register<K: Kernel>(
    session: &mut Session<K>,
    acc: &mut Accumulator,
    staged: &StagedCoil,
    coil: &Coil,
    prefix: Option<&str>,
    ends: bool,
) -> Result<()> {
    for group in &staged.groups {
        acc.registry.register(
            session,
            Label::solid(group.name.clone()),
            Dim::Surface,
            RegionSpec::verbatim(group.entities.clone()),
        )?;
        acc.lcs.push((group.name.clone(), coil.lc()));
    }

    let [z0, z1] = coil.z;
    let rint = coil.rint_range();
    let rext = coil.rext_range();
    let mut faces = vec![
        // chamfer-adjusted effective radii widen the radial query bands
        (Boundary::RInt, Box2::new(rint[0], z0, rint[1], z1)),
        (Boundary::RExt, Box2::new(rext[0], z0, rext[1], z1)),
    ];
    if ends {
        faces.push((Boundary::Hp, Box2::new(coil.r[0], z0, coil.r[1], z0)));
        faces.push((Boundary::Bp, Box2::new(coil.r[0], z1, coil.r[1], z1)));
    }
    for (boundary, extent) in faces {
        acc.registry.register(
            session,
            Label::new(prefix, Stem::Boundary(boundary)),
            Dim::Curve,
            RegionSpec::boxes(vec![extent]),
        )?;
    }
    Ok(())
}
