//! Physical-group registry.
//!
//! Regions are resolved once the model is synchronized, either verbatim from
//! reconciled descendants or by padded bounding-box queries, then mirrored
//! into kernel physical groups. The registry keeps registration order, which
//! the mesh-size composer later walks in reverse.

pub mod channel;
pub mod label;

pub use label::{Boundary, Label, Stem};

use std::collections::{BTreeSet, HashMap};

use slotmap::{new_key_type, SlotMap};
use tracing::{debug, warn};

use crate::error::{RegionError, Result};
use crate::kernel::{Dim, EntityRef, Kernel, Session};
use crate::math::{Box2, BOX_EPSILON};

new_key_type! {
    /// Stable handle to a registered region.
    pub struct RegionId;
}

/// A named set of kernel entities of one dimension, mirrored as a kernel
/// physical group.
#[derive(Debug, Clone)]
pub struct NamedRegion {
    pub label: Label,
    pub dim: Dim,
    pub entities: Vec<EntityRef>,
    /// Kernel-side group id, once mirrored.
    pub group: i32,
}

/// How a region's member entities are determined.
#[derive(Debug, Clone)]
pub enum RegionSpec {
    /// Entities fully inside the union of padded query boxes.
    Boxes { boxes: Vec<Box2>, eps: f64 },
    /// Entities already known, typically reconciled descendants.
    Verbatim { entities: Vec<EntityRef> },
}

impl RegionSpec {
    #[must_use]
    pub fn boxes(boxes: Vec<Box2>) -> Self {
        Self::Boxes {
            boxes,
            eps: BOX_EPSILON,
        }
    }

    #[must_use]
    pub fn verbatim(entities: Vec<EntityRef>) -> Self {
        Self::Verbatim { entities }
    }
}

/// Ordered collection of named regions for one build.
#[derive(Debug, Default)]
pub struct RegionRegistry {
    regions: SlotMap<RegionId, NamedRegion>,
    by_name: HashMap<String, RegionId>,
    order: Vec<RegionId>,
}

impl RegionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves and registers one region, mirroring it as a kernel group.
    ///
    /// A box query that matches nothing registers an empty region with a
    /// warning rather than failing: a thin magnet may legitimately have no
    /// entity at a queried face.
    ///
    /// # Errors
    ///
    /// [`RegionError::DuplicateRegion`] if the rendered name is taken, or a
    /// kernel error if the model is not synchronized.
    pub fn register<K: Kernel>(
        &mut self,
        session: &mut Session<K>,
        label: Label,
        dim: Dim,
        spec: RegionSpec,
    ) -> Result<RegionId> {
        let name = label.to_string();
        if self.by_name.contains_key(&name) {
            return Err(RegionError::DuplicateRegion(name).into());
        }

        let entities = match spec {
            RegionSpec::Verbatim { entities } => entities,
            RegionSpec::Boxes { boxes, eps } => {
                let mut found: BTreeSet<EntityRef> = BTreeSet::new();
                for b in &boxes {
                    found.extend(session.entities_in_box(&b.padded(eps), dim)?);
                }
                found.into_iter().collect()
            }
        };
        if entities.is_empty() {
            warn!(region = %name, %dim, "region resolved to no entities");
        } else {
            debug!(region = %name, %dim, count = entities.len(), "region resolved");
        }

        let group = session.add_physical_group(dim, &entities, &name);
        let id = self.regions.insert(NamedRegion {
            label,
            dim,
            entities,
            group,
        });
        self.by_name.insert(name, id);
        self.order.push(id);
        Ok(id)
    }

    #[must_use]
    pub fn get(&self, id: RegionId) -> Option<&NamedRegion> {
        self.regions.get(id)
    }

    #[must_use]
    pub fn find(&self, label: &Label) -> Option<RegionId> {
        self.by_name.get(&label.to_string()).copied()
    }

    /// Regions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &NamedRegion)> {
        self.order
            .iter()
            .filter_map(|id| self.regions.get(*id).map(|r| (*id, r)))
    }

    /// Regions in reverse registration order.
    pub fn iter_rev(&self) -> impl Iterator<Item = (RegionId, &NamedRegion)> {
        self.order
            .iter()
            .rev()
            .filter_map(|id| self.regions.get(*id).map(|r| (*id, r)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Removes a region and its kernel group.
    ///
    /// # Errors
    ///
    /// [`RegionError::UnknownRegion`] if the handle is stale.
    pub fn remove<K: Kernel>(&mut self, session: &mut Session<K>, id: RegionId) -> Result<()> {
        let region = self
            .regions
            .remove(id)
            .ok_or_else(|| RegionError::UnknownRegion(format!("{id:?}")))?;
        session.remove_physical_group(region.dim, region.group);
        self.by_name.remove(&region.label.to_string());
        self.order.retain(|o| *o != id);
        Ok(())
    }
}
