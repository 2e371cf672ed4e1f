//! Build orchestrator: discovery, staleness, parallel generation, writes.
//!
//! Each SQL file is an independent unit of work (read → parse → probe →
//! emit → write) run on a rayon pool. Workers return their result instead
//! of appending to shared state, and the first error aborts the run.
//!
//! # Staleness
//!
//! For every file, `latest = max(source mtime, generator build time)`. The
//! file is skipped when both outputs exist and are at least as new as
//! `latest`. After a (re)generation both outputs are stamped with `latest`,
//! so an unchanged tree is a no-op on the next run.

use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use rayon::prelude::*;
use serde::Serialize;
use sqlgen_core::{ConnectionFactory, parse_template, probe};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::GeneratorConfig;
use crate::emit::{GeneratedCode, SOURCE_SUFFIX, emit};
use crate::error::{GenerateError, Result};
use crate::identity::BuildIdentity;

/// Outcome for one SQL file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Both outputs were (re)written.
    Generated,
    /// Both outputs were already current; nothing was written.
    UpToDate,
}

/// Output pair for one SQL file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub source: PathBuf,
    pub generated_source: PathBuf,
    pub generated_resource: PathBuf,
    pub status: Status,
}

/// Result of a generation run, sorted by source path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerateReport {
    pub files: Vec<GeneratedFile>,
}

impl GenerateReport {
    pub fn generated_count(&self) -> usize {
        self.count(Status::Generated)
    }

    pub fn up_to_date_count(&self) -> usize {
        self.count(Status::UpToDate)
    }

    /// `(generated source, generated resource)` for every file.
    pub fn outputs(&self) -> Vec<(&Path, &Path)> {
        self.files
            .iter()
            .map(|file| (file.generated_source.as_path(), file.generated_resource.as_path()))
            .collect()
    }

    fn count(&self, status: Status) -> usize {
        self.files.iter().filter(|file| file.status == status).count()
    }
}

/// Per-file working record.
#[derive(Debug, Clone)]
pub struct GenerationUnit {
    pub source: PathBuf,
    /// Path relative to the SQL source root.
    pub relative: PathBuf,
    pub target_source: PathBuf,
    pub target_resource: PathBuf,
    /// `max(source mtime, build time)`; outputs are stamped with it.
    pub latest: SystemTime,
}

impl GenerationUnit {
    /// Resolves output paths and the staleness timestamp for `source`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Io`] if the source metadata cannot be read.
    pub fn new(config: &GeneratorConfig, source: &Path, identity: &BuildIdentity) -> Result<Self> {
        let relative = source
            .strip_prefix(&config.sql_source_dir)
            .unwrap_or(source)
            .to_path_buf();
        let modified = fs::metadata(source)
            .and_then(|meta| meta.modified())
            .map_err(|e| GenerateError::io(source, e))?;

        Ok(Self {
            source: source.to_path_buf(),
            target_source: config
                .generated_source_dir
                .join(relative.with_extension(SOURCE_SUFFIX)),
            target_resource: config.generated_resource_dir.join(&relative),
            latest: modified.max(identity.timestamp()),
            relative,
        })
    }

    /// Returns `true` when both outputs exist and are not older than `latest`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Io`] for metadata failures other than a
    /// missing output.
    pub fn is_up_to_date(&self) -> Result<bool> {
        for output in [&self.target_resource, &self.target_source] {
            let meta = match fs::metadata(output) {
                Ok(meta) => meta,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
                Err(e) => return Err(GenerateError::io(output, e)),
            };
            let modified = meta.modified().map_err(|e| GenerateError::io(output, e))?;
            if modified < self.latest {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Writes both outputs and stamps them with `latest`.
    ///
    /// If the second write fails the first output is removed again.
    fn write(&self, code: &GeneratedCode) -> Result<()> {
        write_atomic(&self.target_resource, code.resource_text.as_bytes(), self.latest)?;
        if let Err(err) = write_atomic(&self.target_source, code.source_text.as_bytes(), self.latest) {
            if let Err(cleanup) = fs::remove_file(&self.target_resource) {
                warn!(
                    path = %self.target_resource.display(),
                    error = %cleanup,
                    "failed to remove resource after source write failed"
                );
            }
            return Err(err);
        }
        Ok(())
    }

    fn into_file(self, status: Status) -> GeneratedFile {
        GeneratedFile {
            source: self.source,
            generated_source: self.target_source,
            generated_resource: self.target_resource,
            status,
        }
    }
}

/// Generates accessors for every `.sql` file under `config.sql_source_dir`.
///
/// # Errors
///
/// Returns the first error raised by any file. Files already written by
/// other workers stay on disk and are complete pairs.
pub fn generate<F: ConnectionFactory>(
    config: &GeneratorConfig,
    factory: &F,
    identity: &BuildIdentity,
) -> Result<GenerateReport> {
    let sources = discover_sql_files(&config.sql_source_dir)?;
    info!(
        root = %config.sql_source_dir.display(),
        count = sources.len(),
        "discovered SQL files"
    );

    let jobs = config
        .jobs
        .filter(|jobs| *jobs > 0)
        .unwrap_or_else(|| default_parallel_jobs(sources.len()));
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    let mut files: Vec<GeneratedFile> = pool.install(|| {
        sources
            .par_iter()
            .map(|source| process_file(config, factory, identity, source))
            .collect::<Result<Vec<_>>>()
    })?;

    // Sort by source path for deterministic output.
    files.sort_by(|a, b| a.source.cmp(&b.source));

    let report = GenerateReport { files };
    info!(
        generated = report.generated_count(),
        up_to_date = report.up_to_date_count(),
        "generation finished"
    );
    Ok(report)
}

/// Processes one SQL file end to end.
///
/// # Errors
///
/// Returns [`GenerateError::Io`] for filesystem failures,
/// [`GenerateError::Codegen`] for parse, probe, and emission failures, and
/// [`GenerateError::InvalidFileName`] for file names that cannot name a type.
pub fn process_file<F: ConnectionFactory>(
    config: &GeneratorConfig,
    factory: &F,
    identity: &BuildIdentity,
    source: &Path,
) -> Result<GeneratedFile> {
    let unit = GenerationUnit::new(config, source, identity)?;
    if !config.force && unit.is_up_to_date()? {
        debug!(source = %source.display(), "outputs up to date");
        return Ok(unit.into_file(Status::UpToDate));
    }

    let raw = fs::read_to_string(source).map_err(|e| GenerateError::io(source, e))?;
    let template = parse_template(&raw).map_err(|e| GenerateError::codegen(source, e))?;
    debug!(
        source = %source.display(),
        params = template.params().len(),
        "parsed template"
    );
    let schema =
        probe(factory, template.populated()).map_err(|e| GenerateError::codegen(source, e))?;
    let code = emit(source, &config.sql_source_dir, &schema, &template)?;
    unit.write(&code)?;

    info!(
        source = %source.display(),
        target = %unit.target_source.display(),
        columns = schema.len(),
        "generated accessor"
    );
    Ok(unit.into_file(Status::Generated))
}

/// Recursively collects `.sql` files under `root`, sorted, without
/// following symlinks.
///
/// # Errors
///
/// Returns [`GenerateError::Io`] if `root` or a directory below it cannot
/// be read.
pub fn discover_sql_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            GenerateError::io(path, e.into())
        })?;
        if entry.file_type().is_file() && entry.path().extension() == Some(OsStr::new("sql")) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn default_parallel_jobs(file_count: usize) -> usize {
    let cpu_count = std::thread::available_parallelism()
        .map(|parallelism| parallelism.get())
        .unwrap_or(4);
    cpu_count.min(file_count.max(1)).max(1)
}

/// Writes `contents` through a temp file in the target directory, then
/// renames it into place with its mtime already set.
fn write_atomic(path: &Path, contents: &[u8], modified: SystemTime) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir).map_err(|e| GenerateError::io(dir, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| GenerateError::io(dir, e))?;
    tmp.write_all(contents)
        .and_then(|()| tmp.flush())
        .map_err(|e| GenerateError::io(path, e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(|e| GenerateError::io(path, e))?;
    }
    tmp.as_file()
        .set_modified(modified)
        .map_err(|e| GenerateError::io(path, e))?;
    tmp.persist(path)
        .map_err(|e| GenerateError::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_discover_sql_files_recurses_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b/nested")).unwrap();
        fs::write(root.join("b/nested/z.sql"), "select 1").unwrap();
        fs::write(root.join("a.sql"), "select 1").unwrap();
        fs::write(root.join("b/notes.txt"), "").unwrap();
        fs::write(root.join("b/upper.SQL"), "select 1").unwrap();

        let files = discover_sql_files(root).unwrap();
        let relative: Vec<&Path> = files
            .iter()
            .map(|path| path.strip_prefix(root).unwrap())
            .collect();
        assert_eq!(relative, vec![Path::new("a.sql"), Path::new("b/nested/z.sql")]);
    }

    #[test]
    fn test_discover_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_sql_files(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, GenerateError::Io { .. }));
    }

    #[test]
    fn test_unit_paths_and_staleness() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let config = GeneratorConfig::new(root.join("sql"), root.join("src"), root.join("res"));
        fs::create_dir_all(root.join("sql/a")).unwrap();
        let source = root.join("sql/a/prices.sql");
        fs::write(&source, "select 1").unwrap();

        let identity = BuildIdentity::new("0.0.0", chrono::DateTime::UNIX_EPOCH);
        let unit = GenerationUnit::new(&config, &source, &identity).unwrap();
        assert_eq!(unit.target_source, root.join("src/a/prices.rs"));
        assert_eq!(unit.target_resource, root.join("res/a/prices.sql"));
        assert!(!unit.is_up_to_date().unwrap());

        let code = GeneratedCode {
            resource_text: "select 1".into(),
            source_text: "// empty\n".into(),
        };
        unit.write(&code).unwrap();
        assert!(unit.is_up_to_date().unwrap());
        let stamped = fs::metadata(&unit.target_source).unwrap().modified().unwrap();
        assert_eq!(stamped, unit.latest);

        // A newer build identity makes existing outputs stale.
        let newer = BuildIdentity::new(
            "0.0.1",
            chrono::DateTime::from(unit.latest + Duration::from_secs(60)),
        );
        let unit = GenerationUnit::new(&config, &source, &newer).unwrap();
        assert!(!unit.is_up_to_date().unwrap());
    }

    #[test]
    fn test_failed_source_write_removes_resource() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        // A file where the source output directory should be.
        fs::write(root.join("src"), "").unwrap();
        let config = GeneratorConfig::new(root.join("sql"), root.join("src"), root.join("res"));
        fs::create_dir_all(root.join("sql")).unwrap();
        let source = root.join("sql/prices.sql");
        fs::write(&source, "select 1").unwrap();

        let identity = BuildIdentity::new("0.0.0", chrono::DateTime::UNIX_EPOCH);
        let unit = GenerationUnit::new(&config, &source, &identity).unwrap();
        let code = GeneratedCode {
            resource_text: "select 1".into(),
            source_text: "// empty\n".into(),
        };
        assert!(unit.write(&code).is_err());
        assert!(!unit.target_resource.exists());
    }

    #[test]
    fn test_report_counts() {
        let file = |name: &str, status| GeneratedFile {
            source: PathBuf::from(format!("{name}.sql")),
            generated_source: PathBuf::from(format!("{name}.rs")),
            generated_resource: PathBuf::from(format!("res/{name}.sql")),
            status,
        };
        let report = GenerateReport {
            files: vec![
                file("a", Status::Generated),
                file("b", Status::UpToDate),
                file("c", Status::Generated),
            ],
        };
        assert_eq!(report.generated_count(), 2);
        assert_eq!(report.up_to_date_count(), 1);
        assert_eq!(report.outputs()[1], (Path::new("b.rs"), Path::new("res/b.sql")));
    }
}
