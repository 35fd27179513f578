//! Bundled in-process kernel backend.
//!
//! Models the external CAD/mesh kernel for tests and headless runs: simple
//! polygons in the (r, z) plane, boolean arrangement by line splitting, a
//! synchronized query cache, a physical-group table and threshold size
//! fields. Geometry is approximate where the real kernel is exact (arcs are
//! sampled polylines), but the contract the engine relies on — dense tag
//! numbering, per-input descendant lists, cache invalidation until
//! synchronize — is faithful.

mod boolean;
mod mesh;
pub(crate) mod poly;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::KernelError;
use crate::math::{Box2, Point2};

use super::{BooleanOutcome, Dim, EntityRef, FieldKind, Kernel, MeshAlgo2d, MeshStats};

use mesh::PlanarMesh;

/// Canonical key for a polygon edge, quantized so shared edges between
/// adjacent surfaces resolve to one derived entity.
type EdgeKey = ((i64, i64), (i64, i64));

const QUANTUM: f64 = 1e9;

fn quantize(p: &Point2) -> (i64, i64) {
    #[allow(clippy::cast_possible_truncation)]
    ((p.x * QUANTUM).round() as i64, (p.y * QUANTUM).round() as i64)
}

fn edge_key(a: &Point2, b: &Point2) -> EdgeKey {
    let qa = quantize(a);
    let qb = quantize(b);
    if qa <= qb {
        (qa, qb)
    } else {
        (qb, qa)
    }
}

#[derive(Debug, Clone)]
struct Group {
    dim: Dim,
    name: String,
    entities: Vec<EntityRef>,
}

/// Query cache rebuilt by `synchronize`; geometric queries only ever read
/// from here, never from staged state.
#[derive(Debug, Default)]
struct QueryIndex {
    boxes: Vec<(EntityRef, Box2)>,
    derived: BTreeMap<i32, (Point2, Point2)>,
}

/// In-process planar kernel.
#[derive(Debug)]
pub struct PlanarKernel {
    next_point: i32,
    next_curve: i32,
    next_surface: i32,
    points: BTreeMap<i32, Point2>,
    curves: BTreeMap<i32, Vec<Point2>>,
    surfaces: BTreeMap<i32, Vec<Point2>>,
    edge_tags: HashMap<EdgeKey, i32>,
    index: QueryIndex,
    groups: BTreeMap<i32, Group>,
    next_group: i32,
    fields: BTreeMap<i32, FieldKind>,
    next_field: i32,
    background: Option<i32>,
    point_size: f64,
    algo: MeshAlgo2d,
    scaling: f64,
    mesh: Option<PlanarMesh>,
}

impl Default for PlanarKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanarKernel {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_point: 1,
            next_curve: 1,
            next_surface: 1,
            points: BTreeMap::new(),
            curves: BTreeMap::new(),
            surfaces: BTreeMap::new(),
            edge_tags: HashMap::new(),
            index: QueryIndex::default(),
            groups: BTreeMap::new(),
            next_group: 1,
            fields: BTreeMap::new(),
            next_field: 1,
            background: None,
            point_size: 30.0,
            algo: MeshAlgo2d::Automatic,
            scaling: 1.0,
            mesh: None,
        }
    }

    fn fresh_curve_tag(&mut self) -> i32 {
        let tag = self.next_curve;
        self.next_curve += 1;
        tag
    }

    fn fresh_surface_tag(&mut self) -> i32 {
        let tag = self.next_surface;
        self.next_surface += 1;
        tag
    }

    fn point_coords(&self, p: EntityRef) -> Point2 {
        debug_assert_eq!(p.dim, Dim::Point);
        self.points
            .get(&p.tag)
            .copied()
            .unwrap_or_else(|| Point2::new(0.0, 0.0))
    }

    /// Endpoints of a synchronized curve entity (standalone or derived).
    fn curve_segment(&self, tag: i32) -> Option<(Point2, Point2)> {
        if let Some(pts) = self.curves.get(&tag) {
            if pts.len() >= 2 {
                return Some((pts[0], pts[pts.len() - 1]));
            }
        }
        self.index.derived.get(&tag).copied()
    }
}

impl Kernel for PlanarKernel {
    fn add_point(&mut self, p: Point2) -> EntityRef {
        let tag = self.next_point;
        self.next_point += 1;
        self.points.insert(tag, p);
        EntityRef::new(Dim::Point, tag)
    }

    fn add_line(&mut self, a: EntityRef, b: EntityRef) -> EntityRef {
        let pa = self.point_coords(a);
        let pb = self.point_coords(b);
        let tag = self.fresh_curve_tag();
        self.curves.insert(tag, vec![pa, pb]);
        EntityRef::curve(tag)
    }

    fn add_rectangle(&mut self, x: f64, y: f64, dx: f64, dy: f64) -> EntityRef {
        let tag = self.fresh_surface_tag();
        self.surfaces.insert(
            tag,
            vec![
                Point2::new(x, y),
                Point2::new(x + dx, y),
                Point2::new(x + dx, y + dy),
                Point2::new(x, y + dy),
            ],
        );
        EntityRef::surface(tag)
    }

    fn add_polygon(&mut self, points: &[Point2]) -> EntityRef {
        let tag = self.fresh_surface_tag();
        let mut poly = points.to_vec();
        if poly::signed_area(&poly) < 0.0 {
            poly.reverse();
        }
        self.surfaces.insert(tag, poly);
        EntityRef::surface(tag)
    }

    fn add_circle_arc(&mut self, start: Point2, center: Point2, end: Point2) -> EntityRef {
        let tag = self.fresh_curve_tag();
        self.curves.insert(tag, sample_arc(start, center, end));
        EntityRef::curve(tag)
    }

    fn copy(&mut self, entity: EntityRef) -> Result<EntityRef, KernelError> {
        match entity.dim {
            Dim::Surface => {
                let poly = self
                    .surfaces
                    .get(&entity.tag)
                    .cloned()
                    .ok_or(KernelError::EntityNotFound {
                        dim: entity.dim.as_u8(),
                        tag: entity.tag,
                    })?;
                let tag = self.fresh_surface_tag();
                self.surfaces.insert(tag, poly);
                Ok(EntityRef::surface(tag))
            }
            Dim::Curve => {
                let pts = self
                    .curves
                    .get(&entity.tag)
                    .cloned()
                    .ok_or(KernelError::EntityNotFound {
                        dim: entity.dim.as_u8(),
                        tag: entity.tag,
                    })?;
                let tag = self.fresh_curve_tag();
                self.curves.insert(tag, pts);
                Ok(EntityRef::curve(tag))
            }
            _ => Err(KernelError::EntityNotFound {
                dim: entity.dim.as_u8(),
                tag: entity.tag,
            }),
        }
    }

    fn rotate(&mut self, entities: &[EntityRef], angle: f64) -> Result<(), KernelError> {
        for e in entities {
            match e.dim {
                Dim::Surface => {
                    let poly = self.surfaces.get_mut(&e.tag).ok_or(KernelError::EntityNotFound {
                        dim: e.dim.as_u8(),
                        tag: e.tag,
                    })?;
                    for p in poly.iter_mut() {
                        *p = poly::rotate_point(p, angle);
                    }
                }
                Dim::Curve => {
                    let pts = self.curves.get_mut(&e.tag).ok_or(KernelError::EntityNotFound {
                        dim: e.dim.as_u8(),
                        tag: e.tag,
                    })?;
                    for p in pts.iter_mut() {
                        *p = poly::rotate_point(p, angle);
                    }
                }
                Dim::Point => {
                    let p = self.points.get_mut(&e.tag).ok_or(KernelError::EntityNotFound {
                        dim: e.dim.as_u8(),
                        tag: e.tag,
                    })?;
                    *p = poly::rotate_point(p, angle);
                }
                Dim::Solid => {
                    return Err(KernelError::EntityNotFound {
                        dim: e.dim.as_u8(),
                        tag: e.tag,
                    })
                }
            }
        }
        Ok(())
    }

    fn remove(&mut self, entities: &[EntityRef]) {
        for e in entities {
            match e.dim {
                Dim::Point => {
                    self.points.remove(&e.tag);
                }
                Dim::Curve => {
                    self.curves.remove(&e.tag);
                }
                Dim::Surface => {
                    self.surfaces.remove(&e.tag);
                }
                Dim::Solid => {}
            }
        }
    }

    fn fragment(
        &mut self,
        domain: &[EntityRef],
        tools: &[EntityRef],
    ) -> Result<BooleanOutcome, KernelError> {
        self.arrange(domain, tools, true)
    }

    fn cut(
        &mut self,
        domain: &[EntityRef],
        tools: &[EntityRef],
    ) -> Result<BooleanOutcome, KernelError> {
        self.arrange(domain, tools, false)
    }

    fn synchronize(&mut self) {
        let mut index = QueryIndex::default();

        for (tag, p) in &self.points {
            index.boxes.push((
                EntityRef::new(Dim::Point, *tag),
                Box2::new(p.x, p.y, p.x, p.y),
            ));
        }
        for (tag, pts) in &self.curves {
            if let Some(b) = Box2::from_points(pts) {
                index.boxes.push((EntityRef::curve(*tag), b));
            }
        }
        for (tag, poly) in &self.surfaces {
            if let Some(b) = Box2::from_points(poly) {
                index.boxes.push((EntityRef::surface(*tag), b));
            }
        }

        // Derived boundary edges of every surface, deduplicated so the edge
        // shared by two adjacent fragments is one entity. Tags persist across
        // synchronize calls via the edge-key map.
        let mut derived: BTreeMap<i32, (Point2, Point2)> = BTreeMap::new();
        let polys: Vec<Vec<Point2>> = self.surfaces.values().cloned().collect();
        for poly in &polys {
            let n = poly.len();
            for i in 0..n {
                let a = poly[i];
                let b = poly[(i + 1) % n];
                let key = edge_key(&a, &b);
                let tag = if let Some(t) = self.edge_tags.get(&key) {
                    *t
                } else {
                    let t = self.fresh_curve_tag();
                    self.edge_tags.insert(key, t);
                    t
                };
                // a fragment sub-curve may already own this edge
                if self.curves.contains_key(&tag) {
                    continue;
                }
                derived.entry(tag).or_insert((a, b));
            }
        }
        for (tag, (a, b)) in &derived {
            index.boxes.push((
                EntityRef::curve(*tag),
                Box2::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y)),
            ));
        }
        index.derived = derived;

        self.index = index;
    }

    fn bounding_box(&self, entity: EntityRef) -> Result<Box2, KernelError> {
        self.index
            .boxes
            .iter()
            .find(|(e, _)| *e == entity)
            .map(|(_, b)| *b)
            .ok_or(KernelError::EntityNotFound {
                dim: entity.dim.as_u8(),
                tag: entity.tag,
            })
    }

    fn entities_in_box(&self, query: &Box2, dim: Dim) -> Vec<EntityRef> {
        self.index
            .boxes
            .iter()
            .filter(|(e, b)| e.dim == dim && query.contains_box(b))
            .map(|(e, _)| *e)
            .collect()
    }

    fn entities(&self, dim: Dim) -> Vec<EntityRef> {
        self.index
            .boxes
            .iter()
            .filter(|(e, _)| e.dim == dim)
            .map(|(e, _)| *e)
            .collect()
    }

    fn add_physical_group(&mut self, dim: Dim, entities: &[EntityRef], name: &str) -> i32 {
        let id = self.next_group;
        self.next_group += 1;
        self.groups.insert(
            id,
            Group {
                dim,
                name: name.to_owned(),
                entities: entities.to_vec(),
            },
        );
        id
    }

    fn remove_physical_group(&mut self, dim: Dim, group: i32) {
        if self.groups.get(&group).is_some_and(|g| g.dim == dim) {
            self.groups.remove(&group);
        }
    }

    fn physical_group_entities(&self, dim: Dim, group: i32) -> Vec<EntityRef> {
        self.groups
            .get(&group)
            .filter(|g| g.dim == dim)
            .map(|g| g.entities.clone())
            .unwrap_or_default()
    }

    fn set_point_size(&mut self, size: f64) {
        self.point_size = size;
    }

    fn add_field(&mut self, kind: FieldKind) -> i32 {
        let id = self.next_field;
        self.next_field += 1;
        self.fields.insert(id, kind);
        id
    }

    fn set_background_field(&mut self, field: i32) {
        self.background = Some(field);
    }

    fn set_algorithm(&mut self, algo: MeshAlgo2d) {
        self.algo = algo;
    }

    fn set_scaling(&mut self, factor: f64) {
        self.scaling = factor;
    }

    fn generate(&mut self) -> Result<MeshStats, KernelError> {
        let mesh = self.triangulate()?;
        let stats = MeshStats {
            nodes: mesh.nodes.len(),
            elements: mesh.triangles.len(),
        };
        self.mesh = Some(mesh);
        Ok(stats)
    }

    fn write(&self, path: &Path) -> Result<(), KernelError> {
        self.write_msh(path)
    }
}

/// Samples a circle arc (counter-clockwise from start to end) as a polyline.
fn sample_arc(start: Point2, center: Point2, end: Point2) -> Vec<Point2> {
    let radius = (start - center).norm();
    let a0 = (start.y - center.y).atan2(start.x - center.x);
    let mut a1 = (end.y - center.y).atan2(end.x - center.x);
    if a1 <= a0 {
        a1 += std::f64::consts::TAU;
    }
    let steps = 16;
    (0..=steps)
        .map(|i| {
            let a = a0 + (a1 - a0) * f64::from(i) / f64::from(steps);
            Point2::new(center.x + radius * a.cos(), center.y + radius * a.sin())
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_bounding_box_after_synchronize() {
        let mut k = PlanarKernel::new();
        let r = k.add_rectangle(100.0, -50.0, 50.0, 100.0);
        k.synchronize();
        let b = k.bounding_box(r).unwrap();
        assert!((b.min.x - 100.0).abs() < 1e-12);
        assert!((b.max.x - 150.0).abs() < 1e-12);
    }

    #[test]
    fn derived_edges_are_queryable() {
        let mut k = PlanarKernel::new();
        k.add_rectangle(100.0, -50.0, 50.0, 100.0);
        k.synchronize();
        // bottom edge of the rectangle
        let hits = k.entities_in_box(
            &Box2::new(99.0, -51.0, 151.0, -49.0),
            Dim::Curve,
        );
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn shared_edge_is_one_entity() {
        let mut k = PlanarKernel::new();
        k.add_rectangle(0.0, 0.0, 1.0, 1.0);
        k.add_rectangle(1.0, 0.0, 1.0, 1.0);
        k.synchronize();
        let hits = k.entities_in_box(&Box2::new(0.9, -0.1, 1.1, 1.1), Dim::Curve);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn edge_tags_stable_across_synchronize() {
        let mut k = PlanarKernel::new();
        k.add_rectangle(0.0, 0.0, 1.0, 1.0);
        k.synchronize();
        let before = k.entities_in_box(&Box2::new(-0.1, -0.1, 1.1, 0.1), Dim::Curve);
        k.synchronize();
        let after = k.entities_in_box(&Box2::new(-0.1, -0.1, 1.1, 0.1), Dim::Curve);
        assert_eq!(before, after);
    }
}
