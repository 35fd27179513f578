//! Per-kind build pipelines.
//!
//! A build stages every primitive, runs the booleans, synchronizes once, and
//! only then resolves regions, because box queries need a committed model.
//! Sites stage all members before the barrier so the whole arrangement is
//! conformal.

pub mod coil;
pub mod insert;
pub mod plate;
pub mod ring;
pub mod section;
pub mod stack;

use std::collections::BTreeSet;

use tracing::info;

use crate::error::{Result, SpecError};
use crate::fragment::{reconcile, BooleanKind, ShapeGroup};
use crate::geometry::Magnet;
use crate::kernel::{Dim, EntityRef, Kernel, Session};
use crate::math::Box2;
use crate::meshsize::SizePolicy;
use crate::regions::{Label, RegionRegistry, RegionSpec, Stem};

/// Air-domain padding, as ratios of the model extents.
#[derive(Debug, Clone, Copy)]
pub struct AirParams {
    pub r_ratio: f64,
    pub z_ratio: f64,
}

impl Default for AirParams {
    fn default() -> Self {
        Self {
            r_ratio: 2.0,
            z_ratio: 2.0,
        }
    }
}

/// Build-time switches.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Surround the model with an air rectangle and far-field regions.
    pub air: Option<AirParams>,
    /// Model slits that carry a width as finite cuts instead of lines.
    pub thick_slits: bool,
}

/// The outcome of a build: the region registry plus everything the sizing
/// stage needs.
#[derive(Debug)]
pub struct Assembly {
    pub name: String,
    pub with_air: bool,
    pub registry: RegionRegistry,
    /// Default characteristic length per region name.
    pub lcs: Vec<(String, f64)>,
    /// Hydraulic channel extents, fed to the size composer as box fields.
    pub channel_boxes: Vec<(Box2, f64)>,
}

impl Assembly {
    /// The default size policy derived from the geometry.
    #[must_use]
    pub fn default_policy(&self) -> SizePolicy {
        SizePolicy::default_for(&self.name, self.lcs.iter().cloned())
    }
}

/// Mutable registration state threaded through the per-kind pipelines.
#[derive(Default)]
pub(crate) struct Accumulator {
    pub(crate) registry: RegionRegistry,
    pub(crate) lcs: Vec<(String, f64)>,
    pub(crate) channel_boxes: Vec<(Box2, f64)>,
}

enum Staged {
    Plate(plate::StagedPlate),
    Section(Vec<ShapeGroup>),
    Coil(coil::StagedCoil),
    Stack(stack::StagedStack),
    Ring(ring::StagedRing),
    Insert(insert::StagedInsert),
}

impl Staged {
    fn groups_mut(&mut self) -> Vec<&mut ShapeGroup> {
        match self {
            Self::Plate(st) => st.groups.iter_mut().collect(),
            Self::Section(groups) => groups.iter_mut().collect(),
            Self::Coil(st) => st.groups.iter_mut().collect(),
            Self::Stack(st) => st.groups.iter_mut().collect(),
            Self::Ring(st) => vec![&mut st.group],
            Self::Insert(st) => st.groups_mut(),
        }
    }
}

struct StagedAir {
    group: ShapeGroup,
    extent: Box2,
}

/// Builds the whole model for one magnet (or site of magnets) and returns
/// the resolved regions.
///
/// # Errors
///
/// Validation, kernel, reconciliation or region errors; nothing is retried.
pub fn build<K: Kernel>(
    session: &mut Session<K>,
    magnet: &Magnet,
    options: &BuildOptions,
) -> Result<Assembly> {
    let name = magnet.name().to_owned();
    let members: Vec<(Option<String>, &Magnet)> = match magnet {
        Magnet::Site(site) => {
            site.validate()?;
            info!(site = %site.name, members = site.magnets.len(), "building site");
            site.magnets
                .iter()
                .map(|m| (Some(m.name().to_owned()), m))
                .collect()
        }
        leaf => vec![(None, leaf)],
    };

    let mut staged = Vec::with_capacity(members.len());
    for (prefix, m) in &members {
        staged.push(stage_magnet(session, m, prefix.as_deref(), options)?);
    }

    let air = match &options.air {
        Some(params) => Some(stage_air(session, magnet, *params, &mut staged)?),
        None => None,
    };

    session.synchronize();

    let mut acc = Accumulator::default();
    for ((prefix, m), st) in members.iter().zip(&staged) {
        register_magnet(session, &mut acc, st, m, prefix.as_deref())?;
    }
    if let Some(air) = &air {
        register_air(session, &mut acc, air)?;
    }
    info!(assembly = %name, regions = acc.registry.len(), "build complete");

    Ok(Assembly {
        name,
        with_air: air.is_some(),
        registry: acc.registry,
        lcs: acc.lcs,
        channel_boxes: acc.channel_boxes,
    })
}

fn stage_magnet<K: Kernel>(
    session: &mut Session<K>,
    magnet: &Magnet,
    prefix: Option<&str>,
    options: &BuildOptions,
) -> Result<Staged> {
    Ok(match magnet {
        Magnet::Plate(p) if p.tierod.is_some() || !p.sector_slits.is_empty() => {
            let base = prefix.unwrap_or(&p.name).to_owned();
            Staged::Section(section::stage(session, p, &base)?)
        }
        Magnet::Plate(p) => Staged::Plate(plate::stage(session, p, prefix, options.thick_slits)?),
        Magnet::Coil(c) => Staged::Coil(coil::stage(session, c, prefix)?),
        Magnet::Stack(s) => Staged::Stack(stack::stage(session, s, prefix)?),
        Magnet::Ring(r) => Staged::Ring(ring::stage(session, r, 0.0, prefix)),
        Magnet::Insert(i) => Staged::Insert(insert::stage(session, i, prefix)?),
        Magnet::Site(s) => {
            return Err(SpecError::UnsupportedMagnet(format!("nested site {}", s.name)).into())
        }
    })
}

fn register_magnet<K: Kernel>(
    session: &mut Session<K>,
    acc: &mut Accumulator,
    staged: &Staged,
    magnet: &Magnet,
    prefix: Option<&str>,
) -> Result<()> {
    match (staged, magnet) {
        (Staged::Plate(st), Magnet::Plate(p)) => plate::register(session, acc, st, p, prefix),
        (Staged::Section(groups), Magnet::Plate(p)) => {
            for group in groups {
                acc.registry.register(
                    session,
                    Label::solid(group.name.clone()),
                    Dim::Surface,
                    RegionSpec::verbatim(group.entities.clone()),
                )?;
                acc.lcs.push((group.name.clone(), p.lc()));
            }
            Ok(())
        }
        (Staged::Coil(st), Magnet::Coil(c)) => coil::register(session, acc, st, c, prefix, true),
        (Staged::Stack(st), Magnet::Stack(s)) => stack::register(session, acc, st, s, prefix),
        (Staged::Ring(st), Magnet::Ring(r)) => {
            ring::register(session, acc, st, r, 0.0, true, true, prefix)
        }
        (Staged::Insert(st), Magnet::Insert(i)) => insert::register(session, acc, st, i, prefix),
        _ => Err(SpecError::UnsupportedMagnet(format!(
            "staging mismatch for {}",
            magnet.name()
        ))
        .into()),
    }
}

/// Stages the air rectangle and fragments it against every built part.
///
/// The parts ride along as tools so their descendants come back positionally;
/// air keeps only the pieces no part claims.
fn stage_air<K: Kernel>(
    session: &mut Session<K>,
    magnet: &Magnet,
    params: AirParams,
    staged: &mut [Staged],
) -> Result<StagedAir> {
    let ([_, r_max], [z0, z1]) = magnet.bounding_extents();
    let dr = r_max * params.r_ratio;
    let dz = (z1 - z0) * params.z_ratio;
    let z0_air = (z0 + z1) / 2.0 - dz / 2.0;
    let extent = Box2::new(0.0, z0_air, dr, z0_air + dz);

    let rect = session.add_rectangle(0.0, z0_air, dr, dz);
    let mut air_group = ShapeGroup::new("Air", vec![rect]);

    let mut part_groups: Vec<&mut ShapeGroup> =
        staged.iter_mut().flat_map(Staged::groups_mut).collect();
    let tools: Vec<EntityRef> = part_groups
        .iter()
        .flat_map(|g| g.entities.iter().copied())
        .collect();
    let fragments = reconcile(
        session,
        std::slice::from_mut(&mut air_group),
        &tools,
        BooleanKind::Fragment,
    )?;

    let mut cursor = 0;
    let mut claimed: BTreeSet<EntityRef> = BTreeSet::new();
    for group in &mut part_groups {
        let len = group.entities.len();
        let mut rebuilt = Vec::new();
        for kids in &fragments[cursor..cursor + len] {
            rebuilt.extend_from_slice(kids);
        }
        cursor += len;
        claimed.extend(rebuilt.iter().copied());
        group.entities = rebuilt;
    }
    air_group.entities.retain(|e| !claimed.contains(e));
    Ok(StagedAir {
        group: air_group,
        extent,
    })
}

fn register_air<K: Kernel>(
    session: &mut Session<K>,
    acc: &mut Accumulator,
    air: &StagedAir,
) -> Result<()> {
    acc.registry.register(
        session,
        Label::bare(Stem::Air),
        Dim::Surface,
        RegionSpec::verbatim(air.group.entities.clone()),
    )?;
    let b = air.extent;
    acc.registry.register(
        session,
        Label::bare(Stem::ZAxis),
        Dim::Curve,
        RegionSpec::boxes(vec![Box2::new(0.0, b.min.y, 0.0, b.max.y)]),
    )?;
    let infty = vec![
        Box2::new(b.min.x, b.min.y, b.max.x, b.min.y),
        Box2::new(b.max.x, b.min.y, b.max.x, b.max.y),
        Box2::new(b.min.x, b.max.y, b.max.x, b.max.y),
    ];
    acc.registry.register(
        session,
        Label::bare(Stem::Infinity),
        Dim::Curve,
        RegionSpec::boxes(infty),
    )?;
    acc.lcs.push(("Air".to_owned(), b.width() / 3.0));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{MagmeshError, ReconcileError};
    use crate::geometry::{Axi, Coil, CoolingSlits, Insert, Plate, Ring};
    use crate::kernel::PlanarKernel;
    use crate::regions::Boundary;

    fn plate(slits: &[f64]) -> Magnet {
        Magnet::Plate(Plate {
            name: "Bint".into(),
            r: [100.0, 150.0],
            z: [-50.0, 50.0],
            axi: Axi {
                h: 50.0,
                turns: vec![1.0],
                pitch: vec![100.0],
            },
            cooling_slits: (!slits.is_empty()).then(|| CoolingSlits {
                radii: slits.to_vec(),
                width: None,
            }),
            tierod: None,
            sector_slits: Vec::new(),
        })
    }

    fn insert() -> Magnet {
        let coil = |name: &str, r: [f64; 2]| Coil {
            name: name.into(),
            r,
            z: [-50.0, 50.0],
            axi: Axi {
                h: 50.0,
                turns: vec![1.0],
                pitch: vec![100.0],
            },
            chamfers: Vec::new(),
        };
        Magnet::Insert(Insert {
            name: "HL".into(),
            innerbore: 15.0,
            outerbore: 45.0,
            coils: vec![coil("H1", [20.0, 25.0]), coil("H2", [30.0, 35.0])],
            rings: vec![Ring {
                name: "R1".into(),
                r: [20.0, 22.0, 33.0, 35.0],
                z: [0.0, 8.0],
            }],
        })
    }

    fn names(assembly: &Assembly) -> Vec<String> {
        assembly
            .registry
            .iter()
            .map(|(_, r)| r.label.to_string())
            .collect()
    }

    #[test]
    fn simple_plate_exposes_four_boundary_regions() {
        let mut s = Session::new(PlanarKernel::new());
        let assembly = build(&mut s, &plate(&[]), &BuildOptions::default()).unwrap();
        assert_eq!(
            names(&assembly),
            vec!["Bint", "HP", "BP", "Rint", "Rext"]
        );
        for b in [Boundary::Hp, Boundary::Bp, Boundary::RInt, Boundary::RExt] {
            let id = assembly
                .registry
                .find(&Label::bare(Stem::Boundary(b)))
                .unwrap();
            assert_eq!(assembly.registry.get(id).unwrap().entities.len(), 1);
        }
    }

    #[test]
    fn two_slit_plate_yields_nine_regions() {
        let mut s = Session::new(PlanarKernel::new());
        let assembly = build(&mut s, &plate(&[120.0, 130.0]), &BuildOptions::default()).unwrap();
        assert_eq!(
            names(&assembly),
            vec!["B1", "B2", "B3", "Slit1", "Slit2", "HP", "BP", "Rint", "Rext"]
        );
        for slit in [Stem::Slit(1), Stem::Slit(2)] {
            let id = assembly.registry.find(&Label::bare(slit)).unwrap();
            assert!(!assembly.registry.get(id).unwrap().entities.is_empty());
        }
    }

    #[test]
    fn slit_on_the_domain_boundary_is_fatal() {
        // a slit line at r = 100 lies on the Rint edge and splits nothing;
        // the naming oracle still promises B1/B2, so the build must abort
        let mut s = Session::new(PlanarKernel::new());
        let err = build(&mut s, &plate(&[100.0]), &BuildOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            MagmeshError::Reconcile(ReconcileError::NameCountMismatch {
                expected: 2,
                got: 1,
                ..
            })
        ));
    }

    #[test]
    fn thick_slits_are_cut_as_bands() {
        let magnet = Magnet::Plate(Plate {
            name: "Bint".into(),
            r: [100.0, 150.0],
            z: [-50.0, 50.0],
            axi: Axi {
                h: 50.0,
                turns: vec![1.0],
                pitch: vec![100.0],
            },
            cooling_slits: Some(CoolingSlits {
                radii: vec![120.0, 130.0],
                width: Some(4.0),
            }),
            tierod: None,
            sector_slits: Vec::new(),
        });
        let options = BuildOptions {
            thick_slits: true,
            ..BuildOptions::default()
        };
        let mut s = Session::new(PlanarKernel::new());
        let assembly = build(&mut s, &magnet, &options).unwrap();
        assert_eq!(
            names(&assembly),
            vec!["B1", "B2", "B3", "Slit1", "Slit2", "HP", "BP", "Rint", "Rext"]
        );
        // each slit band query finds the two realized cut edges
        for slit in [Stem::Slit(1), Stem::Slit(2)] {
            let id = assembly.registry.find(&Label::bare(slit)).unwrap();
            assert_eq!(assembly.registry.get(id).unwrap().entities.len(), 2);
        }
        for name in ["B1", "B2", "B3"] {
            let id = assembly.registry.find(&Label::solid(name)).unwrap();
            assert_eq!(assembly.registry.get(id).unwrap().entities.len(), 1);
        }
    }

    #[test]
    fn insert_exposes_channels_and_retires_constituents() {
        let mut s = Session::new(PlanarKernel::new());
        let assembly = build(&mut s, &insert(), &BuildOptions::default()).unwrap();

        for k in 0..3 {
            let id = assembly
                .registry
                .find(&Label::bare(Stem::Channel(k)))
                .unwrap();
            assert!(
                !assembly.registry.get(id).unwrap().entities.is_empty(),
                "Channel{k} is empty"
            );
        }
        // the constituents were folded in and retired
        assert!(assembly
            .registry
            .find(&Label::boundary("H1", Boundary::RInt))
            .is_none());
        assert!(assembly
            .registry
            .find(&Label::boundary("R1", Boundary::CoolingSlits))
            .is_none());
        assert_eq!(assembly.channel_boxes.len(), 3);
    }

    #[test]
    fn air_build_adds_far_field_regions() {
        let mut s = Session::new(PlanarKernel::new());
        let options = BuildOptions {
            air: Some(AirParams::default()),
            ..BuildOptions::default()
        };
        let assembly = build(&mut s, &plate(&[]), &options).unwrap();
        assert!(assembly.with_air);

        let air = assembly.registry.find(&Label::bare(Stem::Air)).unwrap();
        let air_entities = &assembly.registry.get(air).unwrap().entities;
        assert!(!air_entities.is_empty());

        let solid = assembly.registry.find(&Label::solid("Bint")).unwrap();
        for e in &assembly.registry.get(solid).unwrap().entities {
            assert!(!air_entities.contains(e), "air claims a conductor surface");
        }

        for stem in [Stem::ZAxis, Stem::Infinity] {
            let id = assembly.registry.find(&Label::bare(stem)).unwrap();
            assert!(!assembly.registry.get(id).unwrap().entities.is_empty());
        }
    }

    #[test]
    fn region_names_are_stable_across_fresh_sessions() {
        let run = || {
            let mut s = Session::new(PlanarKernel::new());
            let assembly = build(&mut s, &plate(&[120.0]), &BuildOptions::default()).unwrap();
            names(&assembly)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn default_policy_covers_every_conductor() {
        let mut s = Session::new(PlanarKernel::new());
        let assembly = build(&mut s, &plate(&[120.0, 130.0]), &BuildOptions::default()).unwrap();
        let policy = assembly.default_policy();
        for name in ["B1", "B2", "B3", "Slit1", "Slit2"] {
            assert!(policy.sizes.contains_key(name), "{name} missing");
        }
    }

    #[test]
    fn site_members_are_prefixed() {
        let site = Magnet::Site(crate::geometry::Site {
            name: "M9".into(),
            magnets: vec![plate(&[])],
        });
        let mut s = Session::new(PlanarKernel::new());
        let assembly = build(&mut s, &site, &BuildOptions::default()).unwrap();
        assert!(assembly
            .registry
            .find(&Label::new(Some("Bint"), Stem::Boundary(Boundary::Hp)))
            .is_some());
        // single-surface member keeps its prefixed bare name
        assert!(assembly.registry.find(&Label::solid("Bint")).is_some());
    }
}
