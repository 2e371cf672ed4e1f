//! Generator build identity.
//!
//! A version string plus the time the generator itself was built. The build
//! time takes part in the staleness check: outputs older than the generator
//! are regenerated, so a new generator release rewrites every accessor.
//!
//! The identity is resolved once by the caller and passed into
//! [`generate`](crate::generate); nothing here is process-global.
//!
//! # Examples
//!
//! ```no_run
//! use sqlgen_codegen::{BuildIdentity, IdentityFallback};
//!
//! // Pinned identity from a metadata file checked in next to the build.
//! let identity = BuildIdentity::load("sqlgen-identity.json")
//!     .unwrap_or_else(|_| BuildIdentity::resolve(IdentityFallback::Epoch));
//! println!("sqlgen {} built {}", identity.version, identity.build_time);
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{GenerateError, Result};

/// Version of this generator, recorded in every generated file header.
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// What to use when no build time was compiled in.
///
/// Cargo builds always embed one, so this matters only for builds that skip
/// `build.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityFallback {
    /// Current time. Every file is regenerated on every run.
    Now,
    /// The Unix epoch. Only source modification times drive staleness.
    Epoch,
}

/// Version and build time of the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildIdentity {
    pub version: String,
    /// Serialized as RFC 3339.
    pub build_time: DateTime<Utc>,
}

impl BuildIdentity {
    pub fn new(version: impl Into<String>, build_time: DateTime<Utc>) -> Self {
        Self {
            version: version.into(),
            build_time,
        }
    }

    /// Identity compiled into this binary.
    ///
    /// The build time is `SOURCE_DATE_EPOCH` when it was set at compile
    /// time, otherwise the time this crate was compiled. Returns `None`
    /// only for a build that bypassed the build script.
    pub fn embedded() -> Option<Self> {
        let secs = option_env!("SQLGEN_BUILD_TIME")?.parse::<i64>().ok()?;
        let build_time = DateTime::from_timestamp(secs, 0)?;
        Some(Self::new(GENERATOR_VERSION, build_time))
    }

    /// The embedded identity, or `fallback` when there is none.
    pub fn resolve(fallback: IdentityFallback) -> Self {
        if let Some(identity) = Self::embedded() {
            debug!(build_time = %identity.build_time, "using embedded build identity");
            return identity;
        }
        match fallback {
            IdentityFallback::Now => {
                warn!("no embedded build time; using the current time, every file will be regenerated");
                Self::new(GENERATOR_VERSION, Utc::now())
            }
            IdentityFallback::Epoch => {
                debug!("no embedded build time; staleness follows source files only");
                Self::new(GENERATOR_VERSION, DateTime::UNIX_EPOCH)
            }
        }
    }

    /// Loads an identity from a JSON metadata file.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Io`] if the file cannot be read, or
    /// [`GenerateError::Config`] if it is not a valid identity.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| GenerateError::io(path, e))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| GenerateError::config(path, e))
    }

    /// Saves the identity as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Io`] if the file cannot be created, or
    /// [`GenerateError::Config`] if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| GenerateError::io(path, e))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).map_err(|e| GenerateError::config(path, e))
    }

    /// Build time as a filesystem timestamp.
    pub fn timestamp(&self) -> SystemTime {
        SystemTime::from(self.build_time)
    }
}
