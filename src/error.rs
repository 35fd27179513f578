use thiserror::Error;

/// Top-level error type for the magmesh geometry engine.
#[derive(Debug, Error)]
pub enum MagmeshError {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error(transparent)]
    SizePolicy(#[from] SizePolicyError),
}

/// Errors raised while reading or validating a geometry description.
///
/// All of these are contract violations: they abort the build before any
/// kernel state has been committed.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("unsupported magnet kind: {0}")]
    UnsupportedMagnet(String),

    #[error("turn and pitch sequences differ in length ({turns} vs {pitches})")]
    MismatchedTurnPitch { turns: usize, pitches: usize },

    #[error("zero-area slice at z = {z}")]
    ZeroAreaSlice { z: f64 },

    #[error("requested axial extent [{z_request}] lies inside the turn stack [{z_stack}]")]
    StubInsideStack { z_request: f64, z_stack: f64 },

    #[error("stack {name} has detail level {detail:?} but no winding structure")]
    MissingStructure { name: String, detail: String },

    #[error("failed to read geometry file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse geometry file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Errors surfaced by the CAD/mesh kernel collaborator.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("geometric query `{0}` issued on an unsynchronized model")]
    Unsynchronized(&'static str),

    #[error("entity not found: dim {dim}, tag {tag}")]
    EntityNotFound { dim: u8, tag: i32 },

    #[error("boolean operation failed: {0}")]
    BooleanFailed(String),

    #[error("mesh generation failed: {0}")]
    MeshFailed(String),

    #[error("failed to write mesh file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while reconciling boolean fragment/cut output.
///
/// These are correctness bugs, never transient conditions: a silent drop here
/// would lose a boundary condition downstream.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("{role} {index} produced no dim-{dim} descendants after {op}")]
    EmptyDescendants {
        role: &'static str,
        index: usize,
        dim: u8,
        op: &'static str,
    },

    #[error("kernel returned {got} descendant lists for {expected} inputs")]
    LengthMismatch { expected: usize, got: usize },

    #[error("part {part}: booleans produced {got} conductor surfaces, naming expects {expected}")]
    NameCountMismatch {
        part: String,
        expected: usize,
        got: usize,
    },
}

/// Errors related to the physical-group registry.
#[derive(Debug, Error)]
pub enum RegionError {
    #[error("region `{0}` is not registered")]
    UnknownRegion(String),

    #[error("region `{0}` is already registered")]
    DuplicateRegion(String),
}

/// Errors related to the persisted mesh-size policy.
#[derive(Debug, Error)]
pub enum SizePolicyError {
    #[error("failed to read size policy {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse size policy {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to persist size policy {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for results using [`MagmeshError`].
pub type Result<T> = std::result::Result<T, MagmeshError>;
