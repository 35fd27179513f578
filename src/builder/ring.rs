//! Ring primitives.

use crate::fragment::ShapeGroup;
use crate::geometry::Ring;
use crate::kernel::{Kernel, Session};

/// Stages the ring as one annular rectangle, shifted by `offset_y` so it
/// caps the right end of its coil pair.
pub fn build<K: Kernel>(
    session: &mut Session<K>,
    ring: &Ring,
    offset_y: f64,
    prefix: Option<&str>,
) -> ShapeGroup {
    let rect = session.add_rectangle(
        ring.r[0],
        ring.z[0] + offset_y,
        ring.r[3] - ring.r[0],
        ring.height(),
    );
    ShapeGroup::new(ring.solid_name(prefix), vec![rect])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::kernel::PlanarKernel;
    use approx::assert_relative_eq;

    #[test]
    fn ring_rectangle_is_offset() {
        let ring = Ring {
            name: "R1".into(),
            r: [18.0, 20.0, 30.0, 32.0],
            z: [0.0, 8.0],
        };
        let mut s = Session::new(PlanarKernel::new());
        let group = build(&mut s, &ring, 50.0, None);
        assert_eq!(group.name, "R1");
        s.synchronize();
        let b = s.bounding_box(group.entities[0]).unwrap();
        assert_relative_eq!(b.min.y, 50.0);
        assert_relative_eq!(b.max.y, 58.0);
        assert_relative_eq!(b.width(), 14.0);
    }
}
