//! Persisted mesh-size policy.
//!
//! A policy holds one [`SizeSpec`] per region name plus the global meshing
//! knobs, and lives next to the geometry file as
//! `<name>[_withAir]_meshsize.yaml`. A missing file is not an error: defaults
//! are derived from the geometry and written back so the next run can be
//! tuned by hand. A file that exists but does not parse is fatal.

pub mod fields;

pub use fields::compose;

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SizePolicyError;
use crate::kernel::MeshAlgo2d;

/// Default coarse size applied to every staged point.
pub const DEFAULT_POINT_SIZE: f64 = 30.0;

/// Size ramp for one region: `lc` inside or on the region, `lc_min` right at
/// its curves, `lc_max` beyond `dist_max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeSpec {
    pub lc: f64,
    pub lc_min: f64,
    pub lc_max: f64,
    pub dist_min: f64,
    pub dist_max: f64,
}

impl SizeSpec {
    /// Default ramp around a characteristic length.
    #[must_use]
    pub fn from_lc(lc: f64) -> Self {
        Self {
            lc,
            lc_min: lc / 10.0,
            lc_max: lc * 10.0,
            dist_min: lc,
            dist_max: 10.0 * lc,
        }
    }
}

/// The full sizing policy for one assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizePolicy {
    pub name: String,
    pub algo: MeshAlgo2d,
    pub point_size: f64,
    pub sizes: BTreeMap<String, SizeSpec>,
}

impl SizePolicy {
    /// Builds the default policy from `(region name, lc)` pairs.
    #[must_use]
    pub fn default_for(name: &str, lcs: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            name: name.to_owned(),
            algo: MeshAlgo2d::Automatic,
            point_size: DEFAULT_POINT_SIZE,
            sizes: lcs
                .into_iter()
                .map(|(n, lc)| (n, SizeSpec::from_lc(lc)))
                .collect(),
        }
    }

    /// Writes the policy as YAML next to the geometry file.
    ///
    /// # Errors
    ///
    /// [`SizePolicyError::Persist`] on any filesystem failure.
    pub fn dump(&self, path: &Path) -> Result<(), SizePolicyError> {
        let yaml = serde_yaml::to_string(self).map_err(|source| SizePolicyError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        std::fs::write(path, yaml).map_err(|source| SizePolicyError::Persist {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), "size policy persisted");
        Ok(())
    }
}

/// The on-disk location of a policy, keyed by assembly name and air flag.
#[must_use]
pub fn path_for(dir: &Path, name: &str, with_air: bool) -> PathBuf {
    let file = if with_air {
        format!("{name}_withAir_meshsize.yaml")
    } else {
        format!("{name}_meshsize.yaml")
    };
    dir.join(file)
}

/// Loads the policy for `default.name`, falling back to (and persisting)
/// `default` when no file exists.
///
/// # Errors
///
/// [`SizePolicyError::Parse`] if the file exists but is malformed, or
/// [`SizePolicyError::Io`]/[`SizePolicyError::Persist`] on filesystem
/// failures.
pub fn load_or_default(
    dir: &Path,
    with_air: bool,
    default: SizePolicy,
) -> Result<SizePolicy, SizePolicyError> {
    let path = path_for(dir, &default.name, with_air);
    match std::fs::read_to_string(&path) {
        Ok(yaml) => {
            let policy =
                serde_yaml::from_str(&yaml).map_err(|source| SizePolicyError::Parse {
                    path: path.display().to_string(),
                    source,
                })?;
            debug!(path = %path.display(), "size policy loaded");
            Ok(policy)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            default.dump(&path)?;
            Ok(default)
        }
        Err(source) => Err(SizePolicyError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}
