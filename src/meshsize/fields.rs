//! Size-field composition.
//!
//! One Distance/Threshold pair per sized curve region, one Box field per
//! sized surface region or extra channel box, all folded under a single Min
//! combinator so the tightest constraint wins everywhere.

use tracing::debug;

use crate::error::Result;
use crate::kernel::{Dim, FieldKind, Kernel, Session};
use crate::math::Box2;
use crate::regions::RegionRegistry;

use super::SizePolicy;

/// Installs the policy on the session and returns the background field id,
/// if any field was produced.
///
/// Regions are walked in reverse registration order so fields attached to
/// late, specific regions (channels, slits) are created before the broad
/// early ones; the Min combinator makes the outcome order-free, the walk
/// order only keeps field ids aligned with what a debugging eye expects.
///
/// # Errors
///
/// Kernel query errors if the session is not synchronized.
pub fn compose<K: Kernel>(
    session: &mut Session<K>,
    registry: &RegionRegistry,
    policy: &SizePolicy,
    extra_boxes: &[(Box2, f64)],
) -> Result<Option<i32>> {
    session.set_algorithm(policy.algo);
    session.set_point_size(policy.point_size);

    let mut fields = Vec::new();
    for (_, region) in registry.iter_rev() {
        if region.entities.is_empty() {
            continue;
        }
        let Some(spec) = policy.sizes.get(&region.label.to_string()) else {
            continue;
        };
        match region.dim {
            Dim::Curve => {
                let dist = session.add_field(FieldKind::Distance {
                    edges: region.entities.clone(),
                });
                let threshold = session.add_field(FieldKind::Threshold {
                    input: dist,
                    lc_min: spec.lc_min,
                    lc_max: spec.lc_max,
                    dist_min: spec.dist_min,
                    dist_max: spec.dist_max,
                });
                fields.push(threshold);
            }
            Dim::Surface => {
                for entity in &region.entities {
                    let extent = session.bounding_box(*entity)?;
                    fields.push(session.add_field(FieldKind::Box {
                        extent,
                        v_in: spec.lc,
                        v_out: spec.lc_max,
                    }));
                }
            }
            Dim::Point | Dim::Solid => {}
        }
    }

    for (extent, lc) in extra_boxes {
        fields.push(session.add_field(FieldKind::Box {
            extent: *extent,
            v_in: *lc,
            v_out: policy.point_size,
        }));
    }

    if fields.is_empty() {
        return Ok(None);
    }
    debug!(count = fields.len(), "size fields composed");
    let min = session.add_field(FieldKind::Min { fields });
    session.set_background_field(min);
    Ok(Some(min))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::kernel::PlanarKernel;
    use crate::regions::{Label, RegionSpec, Stem};

    #[test]
    fn sized_surface_region_yields_a_background_field() {
        let mut s = Session::new(PlanarKernel::new());
        let rect = s.add_rectangle(100.0, -50.0, 50.0, 100.0);
        s.synchronize();
        let mut registry = RegionRegistry::new();
        registry
            .register(
                &mut s,
                Label::solid("B1"),
                Dim::Surface,
                RegionSpec::verbatim(vec![rect]),
            )
            .unwrap();

        let policy = SizePolicy::default_for("test", [("B1".to_owned(), 3.0)]);
        let background = compose(&mut s, &registry, &policy, &[]).unwrap();
        assert!(background.is_some());
    }

    #[test]
    fn unsized_registry_installs_nothing() {
        let mut s = Session::new(PlanarKernel::new());
        s.add_rectangle(0.0, 0.0, 1.0, 1.0);
        s.synchronize();
        let registry = RegionRegistry::new();
        let policy = SizePolicy::default_for("test", []);
        assert!(compose(&mut s, &registry, &policy, &[]).unwrap().is_none());
    }

    #[test]
    fn extra_boxes_feed_the_combinator() {
        let mut s = Session::new(PlanarKernel::new());
        s.add_rectangle(0.0, 0.0, 1.0, 1.0);
        s.synchronize();
        let registry = RegionRegistry::new();
        let policy = SizePolicy::default_for("test", []);
        let boxes = [(Box2::new(15.0, -50.0, 20.0, 50.0), 5.0 / 3.0)];
        assert!(compose(&mut s, &registry, &policy, &boxes)
            .unwrap()
            .is_some());
    }
}
