//! Size-field evaluation and triangulation for the planar backend.
//!
//! The background field drives a per-surface sampling density; triangles come
//! from a constrained-free Delaunay pass over boundary vertices plus an
//! interior lattice. The algorithm selector is stored but does not change the
//! sampling backend.

use std::io::Write as _;
use std::path::Path;

use spade::{DelaunayTriangulation, Point2 as SpadePoint, Triangulation};

use crate::math::Point2;

use super::super::FieldKind;
use super::{poly, KernelError, PlanarKernel};

/// Triangles per surface are capped to keep degenerate size specs bounded.
const MAX_LATTICE: usize = 10_000;

#[derive(Debug)]
pub(super) struct PlanarMesh {
    pub nodes: Vec<Point2>,
    pub triangles: Vec<(i32, [usize; 3])>,
}

impl PlanarKernel {
    fn eval_field(&self, id: i32, p: &Point2) -> f64 {
        match self.fields.get(&id) {
            None => self.point_size,
            Some(FieldKind::Distance { edges }) => edges
                .iter()
                .filter_map(|e| self.curve_segment(e.tag))
                .map(|(a, b)| poly::distance_to_segment(&a, &b, p))
                .fold(f64::INFINITY, f64::min),
            Some(FieldKind::Threshold {
                input,
                lc_min,
                lc_max,
                dist_min,
                dist_max,
            }) => {
                let d = self.eval_field(*input, p);
                if d <= *dist_min {
                    *lc_min
                } else if d >= *dist_max {
                    *lc_max
                } else {
                    let t = (d - dist_min) / (dist_max - dist_min);
                    lc_min + t * (lc_max - lc_min)
                }
            }
            Some(FieldKind::Box { extent, v_in, v_out }) => {
                if extent.contains_point(p) {
                    *v_in
                } else {
                    *v_out
                }
            }
            Some(FieldKind::Min { fields }) => {
                let m = fields
                    .iter()
                    .map(|f| self.eval_field(*f, p))
                    .fold(f64::INFINITY, f64::min);
                if m.is_finite() {
                    m
                } else {
                    self.point_size
                }
            }
        }
    }

    /// Target element size at `p` under the active background field.
    pub(super) fn target_size(&self, p: &Point2) -> f64 {
        let size = match self.background {
            Some(id) => self.eval_field(id, p),
            None => self.point_size,
        };
        if size.is_finite() && size > 0.0 {
            size
        } else {
            self.point_size
        }
    }

    pub(super) fn triangulate(&self) -> Result<PlanarMesh, KernelError> {
        let mut mesh = PlanarMesh {
            nodes: Vec::new(),
            triangles: Vec::new(),
        };

        for (tag, polygon) in &self.surfaces {
            let Some(bbox) = crate::math::Box2::from_points(polygon) else {
                continue;
            };
            let h = self
                .target_size(&poly::centroid(polygon))
                .min(bbox.width().max(bbox.height()));
            let h = h.max(min_spacing(&bbox));

            let mut samples: Vec<Point2> = polygon.clone();
            let nx = (bbox.width() / h).ceil().max(1.0);
            let ny = (bbox.height() / h).ceil().max(1.0);
            let dx = bbox.width() / nx;
            let dy = bbox.height() / ny;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (nx, ny) = (nx as usize, ny as usize);
            for i in 0..=nx {
                for j in 0..=ny {
                    #[allow(clippy::cast_precision_loss)]
                    let p = Point2::new(
                        bbox.min.x + dx * i as f64,
                        bbox.min.y + dy * j as f64,
                    );
                    if poly::contains(polygon, &p) {
                        samples.push(p);
                    }
                }
            }

            let mut triangulation: DelaunayTriangulation<SpadePoint<f64>> =
                DelaunayTriangulation::new();
            for p in &samples {
                triangulation
                    .insert(SpadePoint::new(p.x, p.y))
                    .map_err(|e| KernelError::MeshFailed(format!("surface {tag}: {e}")))?;
            }

            let offset = mesh.nodes.len();
            for v in triangulation.vertices() {
                let pos = v.position();
                mesh.nodes.push(Point2::new(pos.x, pos.y));
            }
            for face in triangulation.inner_faces() {
                let [a, b, c] = face.vertices();
                let pa = a.position();
                let pb = b.position();
                let pc = c.position();
                let center = Point2::new(
                    (pa.x + pb.x + pc.x) / 3.0,
                    (pa.y + pb.y + pc.y) / 3.0,
                );
                if poly::contains(polygon, &center) {
                    mesh.triangles.push((
                        *tag,
                        [
                            offset + a.fix().index(),
                            offset + b.fix().index(),
                            offset + c.fix().index(),
                        ],
                    ));
                }
            }
        }

        Ok(mesh)
    }

    pub(super) fn write_msh(&self, path: &Path) -> Result<(), KernelError> {
        let Some(mesh) = &self.mesh else {
            return Err(KernelError::MeshFailed(
                "no mesh generated before write".into(),
            ));
        };
        let io_err = |source: std::io::Error| KernelError::Write {
            path: path.display().to_string(),
            source,
        };
        let mut out = Vec::new();
        writeln!(out, "$MeshFormat\n2.2 0 8\n$EndMeshFormat").map_err(io_err)?;
        writeln!(out, "$Nodes\n{}", mesh.nodes.len()).map_err(io_err)?;
        for (i, p) in mesh.nodes.iter().enumerate() {
            writeln!(
                out,
                "{} {} {} 0",
                i + 1,
                p.x * self.scaling,
                p.y * self.scaling
            )
            .map_err(io_err)?;
        }
        writeln!(out, "$EndNodes").map_err(io_err)?;
        writeln!(out, "$Elements\n{}", mesh.triangles.len()).map_err(io_err)?;
        for (i, (surface, [a, b, c])) in mesh.triangles.iter().enumerate() {
            let group = self
                .groups
                .iter()
                .find(|(_, g)| g.entities.iter().any(|e| e.tag == *surface))
                .map_or(0, |(id, _)| *id);
            writeln!(
                out,
                "{} 2 2 {} {} {} {} {}",
                i + 1,
                group,
                surface,
                a + 1,
                b + 1,
                c + 1
            )
            .map_err(io_err)?;
        }
        writeln!(out, "$EndElements").map_err(io_err)?;
        std::fs::write(path, out).map_err(io_err)
    }
}

/// Floor on the lattice spacing so one surface never exceeds `MAX_LATTICE`
/// sample points.
fn min_spacing(bbox: &crate::math::Box2) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let cells = (MAX_LATTICE as f64).sqrt();
    (bbox.width().max(bbox.height())) / cells
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::PlanarKernel;
    use crate::kernel::{FieldKind, Kernel};
    use crate::math::{Box2, Point2};

    #[test]
    fn threshold_field_ramps_between_bounds() {
        let mut k = PlanarKernel::new();
        let a = k.add_point(Point2::new(0.0, 0.0));
        let b = k.add_point(Point2::new(0.0, 10.0));
        let line = k.add_line(a, b);
        let dist = k.add_field(FieldKind::Distance { edges: vec![line] });
        let thresh = k.add_field(FieldKind::Threshold {
            input: dist,
            lc_min: 1.0,
            lc_max: 10.0,
            dist_min: 2.0,
            dist_max: 6.0,
        });
        k.set_background_field(thresh);
        assert!((k.target_size(&Point2::new(1.0, 5.0)) - 1.0).abs() < 1e-12);
        assert!((k.target_size(&Point2::new(8.0, 5.0)) - 10.0).abs() < 1e-12);
        let mid = k.target_size(&Point2::new(4.0, 5.0));
        assert!(mid > 1.0 && mid < 10.0);
    }

    #[test]
    fn min_field_takes_tightest_constraint() {
        let mut k = PlanarKernel::new();
        let coarse = k.add_field(FieldKind::Box {
            extent: Box2::new(-1.0, -1.0, 1.0, 1.0),
            v_in: 5.0,
            v_out: 5.0,
        });
        let fine = k.add_field(FieldKind::Box {
            extent: Box2::new(-1.0, -1.0, 1.0, 1.0),
            v_in: 0.5,
            v_out: 20.0,
        });
        let min = k.add_field(FieldKind::Min {
            fields: vec![coarse, fine],
        });
        k.set_background_field(min);
        assert!((k.target_size(&Point2::new(0.0, 0.0)) - 0.5).abs() < 1e-12);
        assert!((k.target_size(&Point2::new(3.0, 0.0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn generate_meshes_every_surface() {
        let mut k = PlanarKernel::new();
        k.add_rectangle(0.0, 0.0, 4.0, 2.0);
        k.add_rectangle(6.0, 0.0, 2.0, 2.0);
        k.set_point_size(1.0);
        k.synchronize();
        let stats = k.generate().unwrap();
        assert!(stats.nodes > 4);
        assert!(stats.elements > 2);
    }
}
