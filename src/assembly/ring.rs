//! Ring pipeline.
//!
//! Ring boundary faces are always prefixed by the ring name (`R1_R0n`), both
//! standalone and inside an insert, because the insert's channel groupings
//! refer to them that way.

use crate::builder;
use crate::fragment::ShapeGroup;
use crate::error::Result;
use crate::geometry::Ring;
use crate::kernel::{Dim, Kernel, Session};
use crate::math::Box2;
use crate::regions::{Boundary, Label, RegionSpec};

use super::Accumulator;

pub(super) struct StagedRing {
    pub(super) group: ShapeGroup,
}

pub(super) fn stage<K: Kernel>(
    session: &mut Session<K>,
    ring: &Ring,
    offset: f64,
    prefix: Option<&str>,
) -> StagedRing {
    StagedRing {
        group: builder::ring::build(session, ring, offset, prefix),
    }
}

/// Registers the ring solid and its faces. The cooling slits open on the
/// axial face pointed at by `slits_on_bottom`; `ends` exposes the opposite
/// HP/BP faces, which an insert leaves out.
pub(super) fn register<K: Kernel>(
    session: &mut Session<K>,
    acc: &mut Accumulator,
    staged: &StagedRing,
    ring: &Ring,
    offset: f64,
    slits_on_bottom: bool,
    ends: bool,
    prefix: Option<&str>,
) -> Result<()> {
    let rname = ring.solid_name(prefix);
    acc.registry.register(
        session,
        Label::solid(rname.clone()),
        Dim::Surface,
        RegionSpec::verbatim(staged.group.entities.clone()),
    )?;
    acc.lcs.push((rname.clone(), ring.lc()));

    let [r0, r1, r2, r3] = ring.r;
    let (z0, z1) = (ring.z[0] + offset, ring.z[1] + offset);
    let z_slits = if slits_on_bottom { z0 } else { z1 };

    let mut faces = vec![
        (Boundary::R0n, Box2::new(r0, z0, r0, z1)),
        (Boundary::R1n, Box2::new(r3, z0, r3, z1)),
        (Boundary::CoolingSlits, Box2::new(r1, z_slits, r2, z_slits)),
    ];
    if ends {
        faces.push((Boundary::Hp, Box2::new(r0, z0, r3, z0)));
        faces.push((Boundary::Bp, Box2::new(r0, z1, r3, z1)));
    }
    for (boundary, extent) in faces {
        acc.registry.register(
            session,
            Label::boundary(&rname, boundary),
            Dim::Curve,
            RegionSpec::boxes(vec![extent]),
        )?;
    }
    Ok(())
}
