//! Boolean fragment/cut for the planar backend.
//!
//! Every operand polygon is split by the supporting line of every operand
//! edge and tool segment, so coincident pieces from overlapping operands
//! land on identical vertex sets and can be unified to a single entity.
//! Descendant lists are reported per input, in submission order.

use std::collections::BTreeMap;

use crate::math::{Point2, TOLERANCE};

use super::super::{BooleanOutcome, Dim, EntityRef};
use super::{edge_key, poly, KernelError, PlanarKernel};

/// Quantized (centroid, area) identity of an arrangement piece.
type PieceKey = (i64, i64, i64);

fn piece_key(polygon: &[Point2]) -> PieceKey {
    let c = poly::centroid(polygon);
    let a = poly::signed_area(polygon).abs();
    let q = 1e6;
    #[allow(clippy::cast_possible_truncation)]
    (
        (c.x * q).round() as i64,
        (c.y * q).round() as i64,
        (a * q).round() as i64,
    )
}

fn lerp(a: &Point2, b: &Point2, t: f64) -> Point2 {
    Point2::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y))
}

impl PlanarKernel {
    pub(super) fn arrange(
        &mut self,
        domain: &[EntityRef],
        tools: &[EntityRef],
        keep_tools: bool,
    ) -> Result<BooleanOutcome, KernelError> {
        let inputs: Vec<EntityRef> = domain.iter().chain(tools.iter()).copied().collect();
        let n_domain = domain.len();

        // Snapshot operand geometry before anything is removed.
        let mut surface_inputs: Vec<(usize, Vec<Point2>)> = Vec::new();
        let mut curve_inputs: Vec<(usize, Vec<Point2>)> = Vec::new();
        for (idx, e) in inputs.iter().enumerate() {
            match e.dim {
                Dim::Surface => {
                    let polygon =
                        self.surfaces
                            .get(&e.tag)
                            .cloned()
                            .ok_or(KernelError::EntityNotFound {
                                dim: e.dim.as_u8(),
                                tag: e.tag,
                            })?;
                    surface_inputs.push((idx, polygon));
                }
                Dim::Curve => {
                    let pts =
                        self.curves
                            .get(&e.tag)
                            .cloned()
                            .ok_or(KernelError::EntityNotFound {
                                dim: e.dim.as_u8(),
                                tag: e.tag,
                            })?;
                    curve_inputs.push((idx, pts));
                }
                _ => {
                    return Err(KernelError::BooleanFailed(format!(
                        "unsupported operand dimension {}",
                        e.dim
                    )))
                }
            }
        }

        // A cut subtracts tool surfaces; tool operands produce no pieces.
        let tool_polys: Vec<Vec<Point2>> = if keep_tools {
            Vec::new()
        } else {
            surface_inputs
                .iter()
                .filter(|(idx, _)| *idx >= n_domain)
                .map(|(_, p)| p.clone())
                .collect()
        };

        let mut lines: Vec<(Point2, Point2)> = Vec::new();
        for (_, p) in &surface_inputs {
            let n = p.len();
            for i in 0..n {
                lines.push((p[i], p[(i + 1) % n]));
            }
        }
        for (_, pts) in &curve_inputs {
            for w in pts.windows(2) {
                lines.push((w[0], w[1]));
            }
        }

        let mut descendants: Vec<Vec<EntityRef>> = vec![Vec::new(); inputs.len()];
        let mut created: Vec<EntityRef> = Vec::new();
        let mut piece_tags: BTreeMap<PieceKey, i32> = BTreeMap::new();
        let mut new_surfaces: BTreeMap<i32, Vec<Point2>> = BTreeMap::new();

        for (idx, polygon) in &surface_inputs {
            if !keep_tools && *idx >= n_domain {
                continue;
            }
            let mut pieces = vec![polygon.clone()];
            for (a, b) in &lines {
                let mut next = Vec::new();
                for piece in &pieces {
                    next.extend(poly::split_by_line(piece, a, b));
                }
                pieces = next;
            }
            for piece in pieces {
                let center = poly::centroid(&piece);
                if tool_polys.iter().any(|t| poly::contains(t, &center)) {
                    continue;
                }
                let key = piece_key(&piece);
                let tag = if let Some(t) = piece_tags.get(&key) {
                    *t
                } else {
                    let t = self.fresh_surface_tag();
                    piece_tags.insert(key, t);
                    new_surfaces.insert(t, piece);
                    created.push(EntityRef::surface(t));
                    t
                };
                descendants[*idx].push(EntityRef::surface(tag));
            }
        }

        // Curve operands split where they cross piece edges or each other.
        // Sub-curve tags go through the edge-key map so a sub-curve lying on
        // a fragment boundary is the same entity as the derived edge there.
        let piece_edges: Vec<(Point2, Point2)> = new_surfaces
            .values()
            .flat_map(|p| {
                let n = p.len();
                (0..n).map(move |i| (p[i], p[(i + 1) % n]))
            })
            .collect();

        let mut new_curves: BTreeMap<i32, Vec<Point2>> = BTreeMap::new();
        if keep_tools {
            for (ci, (idx, pts)) in curve_inputs.iter().enumerate() {
                for w in pts.windows(2) {
                    let (a0, a1) = (w[0], w[1]);
                    let mut ts = vec![0.0, 1.0];
                    for (b0, b1) in &piece_edges {
                        if let Some(t) = poly::segment_intersection_t(&a0, &a1, b0, b1) {
                            ts.push(t);
                        }
                    }
                    for (cj, (_, other)) in curve_inputs.iter().enumerate() {
                        if cj == ci {
                            continue;
                        }
                        for v in other.windows(2) {
                            if let Some(t) = poly::segment_intersection_t(&a0, &a1, &v[0], &v[1]) {
                                ts.push(t);
                            }
                        }
                    }
                    ts.sort_by(f64::total_cmp);
                    ts.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
                    for pair in ts.windows(2) {
                        let p0 = lerp(&a0, &a1, pair[0]);
                        let p1 = lerp(&a0, &a1, pair[1]);
                        if (p1 - p0).norm() < TOLERANCE {
                            continue;
                        }
                        let key = edge_key(&p0, &p1);
                        let tag = if let Some(t) = self.edge_tags.get(&key) {
                            *t
                        } else {
                            let t = self.fresh_curve_tag();
                            self.edge_tags.insert(key, t);
                            t
                        };
                        if !new_curves.contains_key(&tag) {
                            new_curves.insert(tag, vec![p0, p1]);
                            created.push(EntityRef::curve(tag));
                        }
                        descendants[*idx].push(EntityRef::curve(tag));
                    }
                }
            }
        }

        // Operands are consumed; their tags do not survive the operation.
        for e in &inputs {
            match e.dim {
                Dim::Surface => {
                    self.surfaces.remove(&e.tag);
                }
                Dim::Curve => {
                    self.curves.remove(&e.tag);
                }
                _ => {}
            }
        }
        self.surfaces.extend(new_surfaces);
        self.curves.extend(new_curves);

        Ok(BooleanOutcome {
            entities: created,
            descendants,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::PlanarKernel;
    use crate::kernel::{Dim, EntityRef, Kernel};
    use crate::math::{Box2, Point2};

    #[test]
    fn fragment_by_line_splits_surface() {
        let mut k = PlanarKernel::new();
        let rect = k.add_rectangle(100.0, -50.0, 50.0, 100.0);
        let a = k.add_point(Point2::new(120.0, -50.0));
        let b = k.add_point(Point2::new(120.0, 50.0));
        let line = k.add_line(a, b);
        let out = k.fragment(&[rect], &[line]).unwrap();
        assert_eq!(out.descendants.len(), 2);
        assert_eq!(out.descendants[0].len(), 2);
        assert!(out.descendants[0].iter().all(|e| e.dim == Dim::Surface));
        assert!(!out.descendants[1].is_empty());
        assert!(out.descendants[1].iter().all(|e| e.dim == Dim::Curve));
    }

    #[test]
    fn fragment_of_disjoint_surfaces_renames_both() {
        let mut k = PlanarKernel::new();
        let a = k.add_rectangle(0.0, 0.0, 1.0, 1.0);
        let b = k.add_rectangle(5.0, 0.0, 1.0, 1.0);
        let out = k.fragment(&[a], &[b]).unwrap();
        assert_eq!(out.descendants[0].len(), 1);
        assert_eq!(out.descendants[1].len(), 1);
        assert_ne!(out.descendants[0][0], out.descendants[1][0]);
        // original tags are gone
        k.synchronize();
        assert!(k.bounding_box(a).is_err());
    }

    #[test]
    fn overlap_piece_is_shared_between_parents() {
        let mut k = PlanarKernel::new();
        let air = k.add_rectangle(0.0, -10.0, 10.0, 20.0);
        let part = k.add_rectangle(2.0, -3.0, 3.0, 6.0);
        let out = k.fragment(&[air], &[part]).unwrap();
        let air_kids = &out.descendants[0];
        let part_kids = &out.descendants[1];
        assert!(part_kids.iter().all(|e| air_kids.contains(e)));
        assert!(air_kids.len() > part_kids.len());
    }

    #[test]
    fn cut_removes_tool_region() {
        let mut k = PlanarKernel::new();
        let base = k.add_rectangle(0.0, 0.0, 10.0, 10.0);
        let hole = k.add_rectangle(4.0, 4.0, 2.0, 2.0);
        let out = k.cut(&[base], &[hole]).unwrap();
        assert!(!out.descendants[0].is_empty());
        assert!(out.descendants[1].is_empty());
        k.synchronize();
        // nothing fully inside the hole footprint survives
        let inside = k.entities_in_box(&Box2::new(3.9, 3.9, 6.1, 6.1), Dim::Surface);
        assert!(inside.is_empty());
    }

    #[test]
    fn fragment_rejects_missing_operand() {
        let mut k = PlanarKernel::new();
        let rect = k.add_rectangle(0.0, 0.0, 1.0, 1.0);
        let err = k.fragment(&[rect], &[EntityRef::surface(99)]).unwrap_err();
        assert!(matches!(
            err,
            crate::error::KernelError::EntityNotFound { dim: 2, tag: 99 }
        ));
    }
}
