//! Insert pipeline: coils coupled by rings, hydraulic channel aggregation.

use tracing::info;

use crate::error::{Result, SpecError};
use crate::fragment::{reconcile, BooleanKind, ShapeGroup};
use crate::geometry::Insert;
use crate::kernel::{Dim, Kernel, Session};
use crate::math::Box2;
use crate::regions::channel::{aggregate, ChannelGrouping};
use crate::regions::{Label, RegionSpec, Stem};
use crate::regions::label::Boundary;

use super::{coil, ring, Accumulator};

pub(super) struct StagedInsert {
    coils: Vec<coil::StagedCoil>,
    rings: Vec<ring::StagedRing>,
}

impl StagedInsert {
    pub(super) fn groups_mut(&mut self) -> Vec<&mut ShapeGroup> {
        let mut out: Vec<&mut ShapeGroup> = Vec::new();
        for c in &mut self.coils {
            out.extend(c.groups.iter_mut());
        }
        for r in &mut self.rings {
            out.push(&mut r.group);
        }
        out
    }
}

fn coil_prefix(insert: &Insert, prefix: Option<&str>, i: usize) -> String {
    match prefix {
        Some(p) => format!("{p}_{}", insert.coils[i].name),
        None => insert.coils[i].name.clone(),
    }
}

pub(super) fn stage<K: Kernel>(
    session: &mut Session<K>,
    insert: &Insert,
    prefix: Option<&str>,
) -> Result<StagedInsert> {
    if insert.rings.len() + 1 > insert.coils.len() {
        return Err(SpecError::UnsupportedMagnet(format!(
            "insert {} has {} rings for {} coils",
            insert.name,
            insert.rings.len(),
            insert.coils.len()
        ))
        .into());
    }

    let mut coils = Vec::with_capacity(insert.coils.len());
    for (i, c) in insert.coils.iter().enumerate() {
        let cname = coil_prefix(insert, prefix, i);
        coils.push(coil::stage(session, c, Some(&cname))?);
    }
    let mut rings = Vec::with_capacity(insert.rings.len());
    for (i, r) in insert.rings.iter().enumerate() {
        rings.push(ring::stage(session, r, insert.ring_offset(i), prefix));
    }

    // each ring is fragmented with the end slices it caps, so the shared
    // faces become conformal interior edges
    for i in 0..insert.rings.len() {
        let top = Insert::ring_on_top(i);
        let end = |n: usize| if top { n - 1 } else { 0 };
        let ia = end(coils[i].groups.len());
        let ib = end(coils[i + 1].groups.len());
        let mut trio = vec![
            rings[i].group.clone(),
            coils[i].groups[ia].clone(),
            coils[i + 1].groups[ib].clone(),
        ];
        reconcile(session, &mut trio, &[], BooleanKind::Fragment)?;
        rings[i].group = trio[0].clone();
        coils[i].groups[ia] = trio[1].clone();
        coils[i + 1].groups[ib] = trio[2].clone();
    }

    info!(insert = %insert.name, coils = coils.len(), rings = rings.len(), "insert staged");
    Ok(StagedInsert { coils, rings })
}

pub(super) fn register<K: Kernel>(
    session: &mut Session<K>,
    acc: &mut Accumulator,
    staged: &StagedInsert,
    insert: &Insert,
    prefix: Option<&str>,
) -> Result<()> {
    for (i, (st, c)) in staged.coils.iter().zip(&insert.coils).enumerate() {
        let cname = coil_prefix(insert, prefix, i);
        coil::register(session, acc, st, c, Some(&cname), false)?;
    }
    for (i, (st, r)) in staged.rings.iter().zip(&insert.rings).enumerate() {
        ring::register(
            session,
            acc,
            st,
            r,
            insert.ring_offset(i),
            Insert::ring_on_top(i),
            false,
            prefix,
        )?;
    }

    // axial end faces, across every coil span
    let hp: Vec<Box2> = insert
        .coils
        .iter()
        .map(|c| Box2::new(c.r[0], c.z[0], c.r[1], c.z[0]))
        .collect();
    let bp: Vec<Box2> = insert
        .coils
        .iter()
        .map(|c| Box2::new(c.r[0], c.z[1], c.r[1], c.z[1]))
        .collect();
    acc.registry.register(
        session,
        Label::new(prefix, Stem::Boundary(Boundary::Hp)),
        Dim::Curve,
        RegionSpec::boxes(hp),
    )?;
    acc.registry.register(
        session,
        Label::new(prefix, Stem::Boundary(Boundary::Bp)),
        Dim::Curve,
        RegionSpec::boxes(bp),
    )?;

    let groupings: Vec<ChannelGrouping> = (0u32..)
        .zip(insert.channels(prefix))
        .map(|(index, members)| ChannelGrouping { index, members })
        .collect();
    aggregate(session, &mut acc.registry, prefix, &groupings)?;

    for (k, (extent, lc)) in (0u32..).zip(insert.channel_boxes()) {
        acc.lcs
            .push((insert.channel_label(prefix, k).to_string(), lc));
        acc.channel_boxes.push((extent, lc));
    }
    Ok(())
}
