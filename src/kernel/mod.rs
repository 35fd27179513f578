pub mod planar;
pub mod session;

pub use planar::PlanarKernel;
pub use session::Session;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::KernelError;
use crate::math::{Box2, Point2};

/// Topological dimension of a kernel entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dim {
    Point,
    Curve,
    Surface,
    Solid,
}

impl Dim {
    #[must_use]
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Point => 0,
            Self::Curve => 1,
            Self::Surface => 2,
            Self::Solid => 3,
        }
    }
}

impl std::fmt::Display for Dim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// An opaque handle to a kernel entity.
///
/// The tag is kernel-assigned and is NOT stable across boolean operations;
/// only positional bookkeeping (see [`crate::fragment`]) survives them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityRef {
    pub dim: Dim,
    pub tag: i32,
}

impl EntityRef {
    #[must_use]
    pub const fn new(dim: Dim, tag: i32) -> Self {
        Self { dim, tag }
    }

    #[must_use]
    pub const fn curve(tag: i32) -> Self {
        Self::new(Dim::Curve, tag)
    }

    #[must_use]
    pub const fn surface(tag: i32) -> Self {
        Self::new(Dim::Surface, tag)
    }
}

/// Output of a boolean fragment/cut call.
#[derive(Debug, Clone)]
pub struct BooleanOutcome {
    /// All entities produced by the operation, in kernel order.
    pub entities: Vec<EntityRef>,
    /// For each input entity (domains first, then tools, in submission
    /// order), the ordered list of its descendants.
    pub descendants: Vec<Vec<EntityRef>>,
}

/// A mesh-size field understood by the mesher.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Distance to a set of curve entities.
    Distance { edges: Vec<EntityRef> },
    /// Classic LcMin/LcMax/DistMin/DistMax ramp over a distance field.
    Threshold {
        input: i32,
        lc_min: f64,
        lc_max: f64,
        dist_min: f64,
        dist_max: f64,
    },
    /// Constant size inside an axis-aligned box.
    Box { extent: Box2, v_in: f64, v_out: f64 },
    /// Minimum-of-fields combinator: the tightest constraint wins.
    Min { fields: Vec<i32> },
}

/// 2D meshing algorithms exposed by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshAlgo2d {
    MeshAdapt,
    Automatic,
    Initial,
    Delaunay,
    FrontalDelaunay,
    Bamg,
}

impl MeshAlgo2d {
    /// The kernel-side numeric id of the algorithm.
    #[must_use]
    pub fn id(self) -> i32 {
        match self {
            Self::MeshAdapt => 1,
            Self::Automatic => 2,
            Self::Initial => 3,
            Self::Delaunay => 5,
            Self::FrontalDelaunay => 6,
            Self::Bamg => 7,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::MeshAdapt => "MeshAdapt",
            Self::Automatic => "Automatic",
            Self::Initial => "Initial",
            Self::Delaunay => "Delaunay",
            Self::FrontalDelaunay => "Frontal-Delaunay",
            Self::Bamg => "BAMG",
        }
    }
}

/// Element counts reported after mesh generation.
#[derive(Debug, Clone, Copy)]
pub struct MeshStats {
    pub nodes: usize,
    pub elements: usize,
}

/// The CAD/mesh kernel collaborator surface.
///
/// Implementations are stateful, non-idempotent, single-session services:
/// re-issuing a primitive call creates a duplicate entity, and every mutating
/// call invalidates the geometric query cache until [`Kernel::synchronize`]
/// runs. [`Session`] makes that discipline explicit; pipeline code should go
/// through it rather than calling a kernel directly.
pub trait Kernel {
    fn add_point(&mut self, p: Point2) -> EntityRef;
    fn add_line(&mut self, a: EntityRef, b: EntityRef) -> EntityRef;
    fn add_rectangle(&mut self, x: f64, y: f64, dx: f64, dy: f64) -> EntityRef;
    /// Closed polygon from a point loop (curve loop + plane surface).
    fn add_polygon(&mut self, points: &[Point2]) -> EntityRef;
    /// Circle arc through `start`/`end` around `center`, approximated or
    /// exact per backend.
    fn add_circle_arc(&mut self, start: Point2, center: Point2, end: Point2) -> EntityRef;

    fn copy(&mut self, entity: EntityRef) -> Result<EntityRef, KernelError>;
    /// Rotates entities around the origin of the plane.
    fn rotate(&mut self, entities: &[EntityRef], angle: f64) -> Result<(), KernelError>;
    fn remove(&mut self, entities: &[EntityRef]);

    /// Boolean fragment: all operands are kept, mutually split at
    /// intersections so the result is conformal.
    fn fragment(
        &mut self,
        domain: &[EntityRef],
        tools: &[EntityRef],
    ) -> Result<BooleanOutcome, KernelError>;

    /// Boolean cut: tools are subtracted from the domain and removed.
    fn cut(
        &mut self,
        domain: &[EntityRef],
        tools: &[EntityRef],
    ) -> Result<BooleanOutcome, KernelError>;

    /// Commits staged geometry and rebuilds the query cache.
    fn synchronize(&mut self);

    fn bounding_box(&self, entity: EntityRef) -> Result<Box2, KernelError>;
    fn entities_in_box(&self, query: &Box2, dim: Dim) -> Vec<EntityRef>;
    fn entities(&self, dim: Dim) -> Vec<EntityRef>;

    fn add_physical_group(&mut self, dim: Dim, entities: &[EntityRef], name: &str) -> i32;
    fn remove_physical_group(&mut self, dim: Dim, group: i32);
    fn physical_group_entities(&self, dim: Dim, group: i32) -> Vec<EntityRef>;

    /// Coarse default size applied to every point before fields are added.
    fn set_point_size(&mut self, size: f64);
    fn add_field(&mut self, kind: FieldKind) -> i32;
    fn set_background_field(&mut self, field: i32);
    fn set_algorithm(&mut self, algo: MeshAlgo2d);
    /// Unit scaling applied to the whole model before generation.
    fn set_scaling(&mut self, factor: f64);

    fn generate(&mut self) -> Result<MeshStats, KernelError>;
    fn write(&self, path: &Path) -> Result<(), KernelError>;
}
