//! Cooling-channel aggregation.
//!
//! An insert's hydraulic channel is the union of boundary faces contributed
//! by several parts (a helix outer face, the facing ring faces). The
//! constituent regions are folded into one `Channel{i}` region and then
//! retired, so the final model exposes channels only.

use std::collections::BTreeSet;

use tracing::info;

use crate::error::{RegionError, Result};
use crate::kernel::{Dim, Kernel, Session};
use crate::regions::{Label, RegionId, RegionRegistry, RegionSpec, Stem};

/// One channel: the labels of the regions whose entities it absorbs.
#[derive(Debug, Clone)]
pub struct ChannelGrouping {
    pub index: u32,
    pub members: Vec<Label>,
}

/// Builds `Channel{i}` regions from `groupings` and retires every member.
///
/// Entities shared between members are deduplicated, so the channel size is
/// the size of the union. Members are retired only after all channels are
/// built, since one region may feed several channels.
///
/// # Errors
///
/// [`RegionError::UnknownRegion`] if a member label is not registered.
pub fn aggregate<K: Kernel>(
    session: &mut Session<K>,
    registry: &mut RegionRegistry,
    prefix: Option<&str>,
    groupings: &[ChannelGrouping],
) -> Result<Vec<RegionId>> {
    let mut retired: BTreeSet<String> = BTreeSet::new();
    let mut retire_ids: Vec<RegionId> = Vec::new();
    let mut channels = Vec::with_capacity(groupings.len());

    for grouping in groupings {
        let mut union = BTreeSet::new();
        for member in &grouping.members {
            let id = registry
                .find(member)
                .ok_or_else(|| RegionError::UnknownRegion(member.to_string()))?;
            let region = registry
                .get(id)
                .ok_or_else(|| RegionError::UnknownRegion(member.to_string()))?;
            union.extend(region.entities.iter().copied());
            if retired.insert(member.to_string()) {
                retire_ids.push(id);
            }
        }
        let label = Label::new(prefix, Stem::Channel(grouping.index));
        info!(channel = %label, members = grouping.members.len(), curves = union.len(), "aggregating channel");
        let id = registry.register(
            session,
            label,
            Dim::Curve,
            RegionSpec::verbatim(union.into_iter().collect()),
        )?;
        channels.push(id);
    }

    for id in retire_ids {
        registry.remove(session, id)?;
    }
    Ok(channels)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::kernel::{EntityRef, PlanarKernel};

    fn setup() -> (Session<PlanarKernel>, RegionRegistry) {
        let mut s = Session::new(PlanarKernel::new());
        s.synchronize();
        (s, RegionRegistry::new())
    }

    fn curves(tags: &[i32]) -> Vec<EntityRef> {
        tags.iter().map(|t| EntityRef::curve(*t)).collect()
    }

    #[test]
    fn union_deduplicates_shared_faces() {
        let (mut s, mut registry) = setup();
        registry
            .register(
                &mut s,
                Label::solid("H1_rExt"),
                Dim::Curve,
                RegionSpec::verbatim(curves(&[1, 2, 3])),
            )
            .unwrap();
        registry
            .register(
                &mut s,
                Label::solid("R1_R0n"),
                Dim::Curve,
                RegionSpec::verbatim(curves(&[3, 4])),
            )
            .unwrap();

        let groupings = [ChannelGrouping {
            index: 0,
            members: vec![Label::solid("H1_rExt"), Label::solid("R1_R0n")],
        }];
        let ids = aggregate(&mut s, &mut registry, None, &groupings).unwrap();

        let channel = registry.get(ids[0]).unwrap();
        assert_eq!(channel.label.to_string(), "Channel0");
        assert_eq!(channel.entities.len(), 4);
    }

    #[test]
    fn constituents_are_retired_after_aggregation() {
        let (mut s, mut registry) = setup();
        registry
            .register(
                &mut s,
                Label::solid("H1_rInt"),
                Dim::Curve,
                RegionSpec::verbatim(curves(&[1])),
            )
            .unwrap();
        registry
            .register(
                &mut s,
                Label::solid("H2_rInt"),
                Dim::Curve,
                RegionSpec::verbatim(curves(&[2])),
            )
            .unwrap();

        // one member feeds two channels; retirement must be deferred
        let groupings = [
            ChannelGrouping {
                index: 0,
                members: vec![Label::solid("H1_rInt")],
            },
            ChannelGrouping {
                index: 1,
                members: vec![Label::solid("H1_rInt"), Label::solid("H2_rInt")],
            },
        ];
        aggregate(&mut s, &mut registry, None, &groupings).unwrap();

        assert!(registry.find(&Label::solid("H1_rInt")).is_none());
        assert!(registry.find(&Label::solid("H2_rInt")).is_none());
        assert!(registry.find(&Label::bare(Stem::Channel(0))).is_some());
        assert_eq!(
            registry
                .get(registry.find(&Label::bare(Stem::Channel(1))).unwrap())
                .unwrap()
                .entities
                .len(),
            2
        );
    }

    #[test]
    fn missing_member_is_an_error() {
        let (mut s, mut registry) = setup();
        let groupings = [ChannelGrouping {
            index: 0,
            members: vec![Label::solid("nope")],
        }];
        let err = aggregate(&mut s, &mut registry, None, &groupings).unwrap_err();
        assert!(matches!(
            err,
            crate::MagmeshError::Region(RegionError::UnknownRegion(_))
        ));
    }
}
