//! Code emitter and build orchestrator for typed SQL accessors.
//!
//! Turns a directory of `.sql` files into Rust accessor modules and stored
//! query resources:
//!
//! - **`emit`**: renders one module from a probed [`Schema`](sqlgen_core::Schema)
//!   and a parsed [`SqlTemplate`](sqlgen_core::SqlTemplate)
//! - **`generate`**: discovers files, checks staleness, runs the
//!   parse → probe → emit pipeline on a worker pool, and writes outputs
//! - **`config`**: [`GeneratorConfig`], loadable from YAML
//! - **`identity`**: [`BuildIdentity`], the generator version and build
//!   time that take part in staleness
//!
//! # Quick start
//!
//! ```no_run
//! use sqlgen_codegen::{BuildIdentity, GeneratorConfig, IdentityFallback, generate};
//! use sqlgen_sqlite::SqliteConnectionFactory;
//!
//! let config = GeneratorConfig::new("sql", "src/generated", "resources/sql");
//! let factory = SqliteConnectionFactory::open("dev.db");
//! let identity = BuildIdentity::resolve(IdentityFallback::Epoch);
//!
//! let report = generate(&config, &factory, &identity).unwrap();
//! println!(
//!     "Generated: {}, Up to date: {}",
//!     report.generated_count(),
//!     report.up_to_date_count()
//! );
//! ```
//!
//! # Using generated modules
//!
//! Generated code refers to `rusqlite` and `sqlgen_runtime` by crate name,
//! so the consuming crate depends on both. Modules can be wired in with
//! `#[path]` attributes or `include!`.

mod config;
mod emit;
mod error;
mod generate;
mod identity;

pub use config::GeneratorConfig;
pub use emit::{GeneratedCode, Naming, SOURCE_SUFFIX, emit};
pub use error::{GenerateError, Result};
pub use generate::{
    GenerateReport, GeneratedFile, GenerationUnit, Status, discover_sql_files, generate,
    process_file,
};
pub use identity::{BuildIdentity, GENERATOR_VERSION, IdentityFallback};
