//! HTS stack pipeline: chunked fragmentation of the detailed winding.

use tracing::info;

use crate::builder;
use crate::error::Result;
use crate::fragment::{reconcile_chunked, ShapeGroup};
use crate::geometry::Stack;
use crate::kernel::{Dim, Kernel, Session};
use crate::math::Box2;
use crate::regions::{Boundary, Label, RegionSpec, Stem};

use super::Accumulator;

pub(super) struct StagedStack {
    pub(super) groups: Vec<ShapeGroup>,
}

pub(super) fn stage<K: Kernel>(
    session: &mut Session<K>,
    stack: &Stack,
    prefix: Option<&str>,
) -> Result<StagedStack> {
    let shapes = builder::stack::build(session, stack, prefix)?;
    let mut groups = shapes.flatten();
    info!(stack = %stack.name, parts = groups.len(), "fragmenting stack");
    reconcile_chunked(session, &mut groups)?;
    Ok(StagedStack { groups })
}

pub(super) fn register<K: Kernel>(
    session: &mut Session<K>,
    acc: &mut Accumulator,
    staged: &StagedStack,
    stack: &Stack,
    prefix: Option<&str>,
) -> Result<()> {
    for group in &staged.groups {
        acc.registry.register(
            session,
            Label::solid(group.name.clone()),
            Dim::Surface,
            RegionSpec::verbatim(group.entities.clone()),
        )?;
        acc.lcs.push((group.name.clone(), stack.lc()));
    }

    let [r0, r1] = stack.r;
    let [z0, z1] = stack.z;
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
    Ok(())
}
