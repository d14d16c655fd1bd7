//! Content-addressed on-disk cache of rendered fragments.
//!
//! Entries live at `<dir>/<sha256>.html`, keyed by [`cache_digest`] over the
//! input text and the full argument vector. A hit refreshes the entry's
//! modification time, so retention behaves like "unused for" rather than
//! "created before". A miss renders into a private temp file that is renamed
//! onto the entry path only after the renderer succeeds, so failed or
//! concurrent renders never leave a partial entry behind.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::{Builder, TempPath};
use tracing::{debug, warn};

use crate::command::{INPUT_FLAG, OUTPUT_FLAG};
use crate::digest::cache_digest;
use crate::error::{RenderError, RenderFailure};
use crate::janitor;
use crate::process::ProcessExecutor;

/// Tracing target for cache operations.
const CACHE_TARGET: &str = "mdkatex_renderer::cache";

/// Extension of cached output files.
pub const OUTPUT_EXTENSION: &str = "html";

/// Memoizes renderer output on disk and prunes it after every render.
#[derive(Debug, Clone)]
pub struct RenderCache {
    dir: PathBuf,
    retention: Duration,
}

impl RenderCache {
    /// Creates a cache rooted at `dir` whose entries expire after `retention`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, retention: Duration) -> Self {
        Self {
            dir: dir.into(),
            retention,
        }
    }

    /// Cache directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Retention window applied by the janitor.
    #[must_use]
    pub const fn retention(&self) -> Duration {
        self.retention
    }

    /// Path of the entry for `digest`.
    #[must_use]
    pub fn entry_path(&self, digest: &str) -> PathBuf {
        self.dir.join(format!("{digest}.{OUTPUT_EXTENSION}"))
    }

    /// Returns the trimmed rendering of `text` with `argv`, running the
    /// renderer through `executor` only on a cache miss.
    ///
    /// The janitor sweeps the cache directory before this returns, whatever
    /// the outcome.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] carrying `text` when the renderer fails or a
    /// cache file cannot be written or read.
    pub fn render<E>(&self, executor: &E, argv: &[String], text: &str) -> Result<String, RenderError>
    where
        E: ProcessExecutor + ?Sized,
    {
        let result = self.lookup_or_render(executor, argv, text);
        let removed = janitor::sweep(&self.dir, self.retention);
        if removed > 0 {
            debug!(target: CACHE_TARGET, removed, "expired cache entries removed");
        }
        result
            .map(|html| html.trim().to_owned())
            .map_err(|failure| RenderError::new(text, failure))
    }

    fn lookup_or_render<E>(
        &self,
        executor: &E,
        argv: &[String],
        text: &str,
    ) -> Result<String, RenderFailure>
    where
        E: ProcessExecutor + ?Sized,
    {
        let digest = cache_digest(text, argv);
        let entry = self.entry_path(&digest);

        if entry.is_file() {
            debug!(target: CACHE_TARGET, %digest, "cache hit");
            touch(&entry);
        } else {
            debug!(target: CACHE_TARGET, %digest, "cache miss");
            self.render_entry(executor, argv, text, &digest, &entry)?;
        }

        fs::read_to_string(&entry).map_err(|error| RenderFailure::cache_io(&entry, error))
    }

    fn render_entry<E>(
        &self,
        executor: &E,
        argv: &[String],
        text: &str,
        digest: &str,
        entry: &Path,
    ) -> Result<(), RenderFailure>
    where
        E: ProcessExecutor + ?Sized,
    {
        fs::create_dir_all(&self.dir)
            .map_err(|error| RenderFailure::cache_io(&self.dir, error))?;

        let input = self.write_input(digest, text)?;
        let output = self.output_path(digest)?;

        let mut invocation = argv.to_vec();
        invocation.extend([
            INPUT_FLAG.to_owned(),
            input.to_string_lossy().into_owned(),
            OUTPUT_FLAG.to_owned(),
            output.to_string_lossy().into_owned(),
        ]);

        executor.execute(&invocation).into_stdout()?;
        if !output.is_file() {
            return Err(RenderFailure::MissingOutput {
                path: output.to_path_buf(),
            });
        }

        output
            .persist(entry)
            .map_err(|error| RenderFailure::cache_io(entry, error.error))?;
        // `input` drops here and removes the temp input file.
        Ok(())
    }

    fn write_input(&self, digest: &str, text: &str) -> Result<TempPath, RenderFailure> {
        let mut file = Builder::new()
            .prefix(digest)
            .suffix(".tex")
            .tempfile_in(&self.dir)
            .map_err(|error| RenderFailure::cache_io(&self.dir, error))?;
        file.write_all(text.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|error| RenderFailure::cache_io(file.path(), error))?;
        Ok(file.into_temp_path())
    }

    /// Reserves a unique output path and removes the placeholder, so the
    /// file exists afterwards only if the renderer wrote it.
    fn output_path(&self, digest: &str) -> Result<TempPath, RenderFailure> {
        let path = Builder::new()
            .prefix(digest)
            .suffix(".html.part")
            .tempfile_in(&self.dir)
            .map(tempfile::NamedTempFile::into_temp_path)
            .map_err(|error| RenderFailure::cache_io(&self.dir, error))?;
        fs::remove_file(&path).map_err(|error| RenderFailure::cache_io(&path, error))?;
        Ok(path)
    }
}

/// Refreshes the modification time of a cache hit; failures only log.
fn touch(path: &Path) {
    let result = File::options()
        .append(true)
        .open(path)
        .and_then(|file| file.set_modified(SystemTime::now()));
    if let Err(error) = result {
        warn!(
            target: CACHE_TARGET,
            path = %path.display(),
            %error,
            "failed to refresh cache entry"
        );
    }
}
