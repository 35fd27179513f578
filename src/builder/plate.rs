//! Plate primitives: one rectangle per axial slice, plus slit tools.

use crate::error::Result;
use crate::fragment::ShapeGroup;
use crate::geometry::Plate;
use crate::kernel::{EntityRef, Kernel, Session};
use crate::math::Point2;

/// Stages one rectangle per slice; group `i` holds slice `i`.
///
/// # Errors
///
/// Propagates winding validation errors.
pub fn build<K: Kernel>(session: &mut Session<K>, plate: &Plate) -> Result<Vec<ShapeGroup>> {
    let x = plate.r[0];
    let dr = plate.r[1] - plate.r[0];
    let slices = plate.slices()?;
    let mut groups = Vec::with_capacity(slices.len());
    for (i, slice) in slices.iter().enumerate() {
        let rect = session.add_rectangle(x, slice.z0, dr, slice.dz);
        groups.push(ShapeGroup::new(
            format!("{}_slice{i}", plate.name),
            vec![rect],
        ));
    }
    Ok(groups)
}

/// Zero-width slit tools: one full-height line per slit radius.
pub fn slit_lines<K: Kernel>(session: &mut Session<K>, plate: &Plate) -> Vec<EntityRef> {
    plate
        .slit_radii()
        .iter()
        .map(|&r| {
            let a = session.add_point(Point2::new(r, plate.z[0]));
            let b = session.add_point(Point2::new(r, plate.z[1]));
            session.add_line(a, b)
        })
        .collect()
}

/// Finite-width slit tools: one full-height rectangle per slit radius, for
/// slits that carry a width. Returns `(slit index, tool)` pairs.
pub fn slit_rects<K: Kernel>(
    session: &mut Session<K>,
    plate: &Plate,
    width: f64,
) -> Vec<(usize, EntityRef)> {
    plate
        .slit_radii()
        .iter()
        .enumerate()
        .map(|(i, &r)| {
            let rect = session.add_rectangle(
                r - width / 2.0,
                plate.z[0],
                width,
                plate.z[1] - plate.z[0],
            );
            (i, rect)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Axi, CoolingSlits};
    use crate::kernel::{Dim, PlanarKernel};
    use crate::math::Box2;

    fn plate() -> Plate {
        Plate {
            name: "Bint".into(),
            r: [100.0, 150.0],
            z: [-50.0, 50.0],
            axi: Axi {
                h: 50.0,
                turns: vec![1.0, 1.0],
                pitch: vec![50.0, 50.0],
            },
            cooling_slits: Some(CoolingSlits {
                radii: vec![120.0],
                width: None,
            }),
            tierod: None,
            sector_slits: Vec::new(),
        }
    }

    #[test]
    fn one_rectangle_per_slice() {
        let mut s = Session::new(PlanarKernel::new());
        let groups = build(&mut s, &plate()).unwrap();
        assert_eq!(groups.len(), 2);
        s.synchronize();
        let b = s.bounding_box(groups[0].entities[0]).unwrap();
        assert!((b.min.y + 50.0).abs() < 1e-12);
        assert!((b.max.y - 0.0).abs() < 1e-12);
    }

    #[test]
    fn slit_lines_span_full_height() {
        let mut s = Session::new(PlanarKernel::new());
        let lines = slit_lines(&mut s, &plate());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].dim, Dim::Curve);
        s.synchronize();
        let b = s.bounding_box(lines[0]).unwrap();
        assert!(b.contains_box(&Box2::new(120.0, -50.0, 120.0, 50.0)));
    }
}
