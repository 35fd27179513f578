use std::path::Path;

use crate::error::{KernelError, Result};
use crate::math::{Box2, Point2};

use super::{BooleanOutcome, Dim, EntityRef, FieldKind, Kernel, MeshAlgo2d, MeshStats};

/// Explicit wrapper around the kernel's single mutable model context.
///
/// Every kernel-mutating call marks the session dirty; geometric queries on a
/// dirty session fail with [`KernelError::Unsynchronized`] instead of reading
/// a stale cache. [`Session::synchronize`] is the explicit barrier.
///
/// There is no retry or cancellation model: kernel operations are not
/// idempotent, so a failed build is abandoned, never re-driven.
#[derive(Debug)]
pub struct Session<K> {
    kernel: K,
    dirty: bool,
}

impl<K: Kernel> Session<K> {
    #[must_use]
    pub fn new(kernel: K) -> Self {
        Self {
            kernel,
            dirty: false,
        }
    }

    /// Consumes the session, returning the kernel.
    pub fn into_kernel(self) -> K {
        self.kernel
    }

    #[must_use]
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Commits staged geometry; required before any geometric query.
    pub fn synchronize(&mut self) {
        self.kernel.synchronize();
        self.dirty = false;
    }

    fn ensure_synced(&self, op: &'static str) -> Result<()> {
        if self.dirty {
            return Err(KernelError::Unsynchronized(op).into());
        }
        Ok(())
    }

    // --- Primitive creation (staging) ---

    pub fn add_point(&mut self, p: Point2) -> EntityRef {
        self.dirty = true;
        self.kernel.add_point(p)
    }

    pub fn add_line(&mut self, a: EntityRef, b: EntityRef) -> EntityRef {
        self.dirty = true;
        self.kernel.add_line(a, b)
    }

    pub fn add_rectangle(&mut self, x: f64, y: f64, dx: f64, dy: f64) -> EntityRef {
        self.dirty = true;
        self.kernel.add_rectangle(x, y, dx, dy)
    }

    pub fn add_polygon(&mut self, points: &[Point2]) -> EntityRef {
        self.dirty = true;
        self.kernel.add_polygon(points)
    }

    pub fn add_circle_arc(&mut self, start: Point2, center: Point2, end: Point2) -> EntityRef {
        self.dirty = true;
        self.kernel.add_circle_arc(start, center, end)
    }

    // --- Transforms ---

    pub fn copy(&mut self, entity: EntityRef) -> Result<EntityRef> {
        self.dirty = true;
        Ok(self.kernel.copy(entity)?)
    }

    pub fn rotate(&mut self, entities: &[EntityRef], angle: f64) -> Result<()> {
        self.dirty = true;
        Ok(self.kernel.rotate(entities, angle)?)
    }

    pub fn remove(&mut self, entities: &[EntityRef]) {
        self.dirty = true;
        self.kernel.remove(entities);
    }

    // --- Boolean operations ---

    pub fn fragment(
        &mut self,
        domain: &[EntityRef],
        tools: &[EntityRef],
    ) -> Result<BooleanOutcome> {
        self.dirty = true;
        Ok(self.kernel.fragment(domain, tools)?)
    }

    pub fn cut(&mut self, domain: &[EntityRef], tools: &[EntityRef]) -> Result<BooleanOutcome> {
        self.dirty = true;
        Ok(self.kernel.cut(domain, tools)?)
    }

    // --- Geometric queries (require a synchronized model) ---

    pub fn bounding_box(&self, entity: EntityRef) -> Result<Box2> {
        self.ensure_synced("bounding_box")?;
        Ok(self.kernel.bounding_box(entity)?)
    }

    pub fn entities_in_box(&self, query: &Box2, dim: Dim) -> Result<Vec<EntityRef>> {
        self.ensure_synced("entities_in_box")?;
        Ok(self.kernel.entities_in_box(query, dim))
    }

    pub fn entities(&self, dim: Dim) -> Result<Vec<EntityRef>> {
        self.ensure_synced("entities")?;
        Ok(self.kernel.entities(dim))
    }

    // --- Physical groups ---

    pub fn add_physical_group(&mut self, dim: Dim, entities: &[EntityRef], name: &str) -> i32 {
        self.kernel.add_physical_group(dim, entities, name)
    }

    pub fn remove_physical_group(&mut self, dim: Dim, group: i32) {
        self.kernel.remove_physical_group(dim, group);
    }

    #[must_use]
    pub fn physical_group_entities(&self, dim: Dim, group: i32) -> Vec<EntityRef> {
        self.kernel.physical_group_entities(dim, group)
    }

    // --- Mesh sizing and generation ---

    pub fn set_point_size(&mut self, size: f64) {
        self.kernel.set_point_size(size);
    }

    pub fn add_field(&mut self, kind: FieldKind) -> i32 {
        self.kernel.add_field(kind)
    }

    pub fn set_background_field(&mut self, field: i32) {
        self.kernel.set_background_field(field);
    }

    pub fn set_algorithm(&mut self, algo: MeshAlgo2d) {
        self.kernel.set_algorithm(algo);
    }

    pub fn set_scaling(&mut self, factor: f64) {
        self.kernel.set_scaling(factor);
    }

    pub fn generate(&mut self) -> Result<MeshStats> {
        self.ensure_synced("generate")?;
        Ok(self.kernel.generate()?)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        Ok(self.kernel.write(path)?)
    }
}
