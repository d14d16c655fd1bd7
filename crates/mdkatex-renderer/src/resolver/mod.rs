//! Discovery of a working renderer executable.
//!
//! Resolution prefers, in order:
//!
//! 1. a previously persisted invocation whose executable still exists;
//! 2. the first search-path candidate that answers `--version` with a
//!    version number (plain `katex` or a `npx --no-install katex` wrapper);
//! 3. the newest bundled binary matching the current platform.
//!
//! Successful search results are persisted, one token per line, so later
//! processes skip the search.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use globset::Glob;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::ResolveError;
use crate::files::atomic_write;
use crate::process::{ProcessExecutor, ProcessOutcome};

/// Tracing target for resolution.
const RESOLVER_TARGET: &str = "mdkatex_renderer::resolver";

/// File name of the persisted resolution inside the cache directory.
pub const RESOLUTION_FILE_NAME: &str = "local_katex_cmd.txt";

/// Directory searched after every search-path entry.
pub const FALLBACK_BIN_DIR: &str = "/usr/local/bin";

/// Package runner used to invoke a locally installed renderer.
const PACKAGE_RUNNER: &str = "npx";

#[expect(
    clippy::expect_used,
    reason = "the version pattern is a constant known to compile"
)]
static VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+").expect("version pattern compiles"));

/// Invocation prefix for the renderer: the executable and any wrapper tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinary {
    argv: Vec<String>,
}

impl ResolvedBinary {
    /// Wraps an invocation prefix.
    #[must_use]
    pub const fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    /// The full prefix, executable first.
    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// The executable path, or an empty string for an empty prefix.
    #[must_use]
    pub fn program(&self) -> &str {
        self.argv.first().map_or("", String::as_str)
    }
}

/// Operating system and architecture names used for bundled binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    os: String,
    arch: String,
}

impl Platform {
    /// Creates a platform description, normalising the architecture.
    #[must_use]
    pub fn new(os: impl Into<String>, arch: &str) -> Self {
        let name: String = os.into();
        Self {
            arch: normalize_arch(&name, arch).to_owned(),
            os: name,
        }
    }

    /// Describes the platform this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        Self::new(os_name(env::consts::OS), env::consts::ARCH)
    }

    /// Operating system name (`Linux`, `Darwin`, `Windows`, ...).
    #[must_use]
    pub fn os(&self) -> &str {
        &self.os
    }

    /// Normalised architecture name.
    #[must_use]
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Returns `true` on the Windows family.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == "Windows"
    }

    /// Glob selecting bundled binaries for this platform.
    #[must_use]
    pub fn bundle_glob(&self) -> String {
        format!("*_{}-{}*", self.arch, self.os)
    }
}

fn os_name(os: &str) -> &str {
    match os {
        "linux" => "Linux",
        "macos" => "Darwin",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        other => other,
    }
}

/// Maps Rust and Windows architecture names onto the names bundles use.
fn normalize_arch<'a>(os: &str, arch: &'a str) -> &'a str {
    match (os, arch) {
        (_, "AMD64" | "amd64") => "x86_64",
        ("Darwin", "aarch64") => "arm64",
        (_, other) => other,
    }
}

/// Where and how the resolver looks for a renderer.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    command_name: String,
    search_path: Option<OsString>,
    fallback_dir: Option<PathBuf>,
    bundle_dir: PathBuf,
    resolution_file: PathBuf,
    platform: Platform,
}

impl ResolverSettings {
    /// Default settings persisting into `cache_dir` and scanning `bundle_dir`.
    ///
    /// The search path defaults to the `PATH` environment variable followed
    /// by [`FALLBACK_BIN_DIR`].
    #[must_use]
    pub fn new(cache_dir: &Path, bundle_dir: impl Into<PathBuf>) -> Self {
        Self {
            command_name: String::from("katex"),
            search_path: None,
            fallback_dir: Some(PathBuf::from(FALLBACK_BIN_DIR)),
            bundle_dir: bundle_dir.into(),
            resolution_file: cache_dir.join(RESOLUTION_FILE_NAME),
            platform: Platform::current(),
        }
    }

    /// Overrides the renderer command name.
    #[must_use]
    pub fn with_command_name(mut self, name: impl Into<String>) -> Self {
        self.command_name = name.into();
        self
    }

    /// Uses `search_path` (in `PATH` syntax) instead of the environment.
    #[must_use]
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    /// Replaces or removes the fallback directory.
    #[must_use]
    pub fn with_fallback_dir(mut self, fallback_dir: Option<PathBuf>) -> Self {
        self.fallback_dir = fallback_dir;
        self
    }

    /// Overrides the platform used for candidates and bundle lookup.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Renderer command name.
    #[must_use]
    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    /// Path of the persisted resolution file.
    #[must_use]
    pub fn resolution_file(&self) -> &Path {
        &self.resolution_file
    }

    /// Directory scanned for bundled binaries.
    #[must_use]
    pub fn bundle_dir(&self) -> &Path {
        &self.bundle_dir
    }

    /// Platform used for candidates and bundle lookup.
    #[must_use]
    pub const fn platform(&self) -> &Platform {
        &self.platform
    }
}

/// Locates a renderer invocation according to [`ResolverSettings`].
#[derive(Debug, Clone)]
pub struct BinaryResolver {
    settings: ResolverSettings,
}

impl BinaryResolver {
    /// Creates a resolver.
    #[must_use]
    pub const fn new(settings: ResolverSettings) -> Self {
        Self { settings }
    }

    /// Returns the resolver settings.
    #[must_use]
    pub const fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Finds a usable renderer, probing candidates through `executor`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::RendererNotFound`] when neither the search
    /// path nor the bundle directory yields a renderer.
    pub fn resolve<E>(&self, executor: &E) -> Result<ResolvedBinary, ResolveError>
    where
        E: ProcessExecutor + ?Sized,
    {
        if let Some(binary) = self.load_persisted() {
            debug!(
                target: RESOLVER_TARGET,
                program = binary.program(),
                "reusing persisted renderer resolution"
            );
            return Ok(binary);
        }

        if let Some(binary) = self.search(executor) {
            info!(
                target: RESOLVER_TARGET,
                argv = ?binary.argv(),
                "resolved renderer on search path"
            );
            self.persist(&binary);
            return Ok(binary);
        }

        if let Some(binary) = self.bundled() {
            info!(
                target: RESOLVER_TARGET,
                program = binary.program(),
                "using bundled renderer"
            );
            return Ok(binary);
        }

        let platform = self.settings.platform();
        Err(ResolveError::RendererNotFound {
            os: platform.os().to_owned(),
            arch: platform.arch().to_owned(),
        })
    }

    /// Directories searched in order: the search path, then the fallback.
    #[must_use]
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        let search_path = self
            .settings
            .search_path
            .clone()
            .or_else(|| env::var_os("PATH"));
        let mut dirs: Vec<PathBuf> = search_path
            .map(|value| env::split_paths(&value).collect())
            .unwrap_or_default();
        if let Some(fallback) = &self.settings.fallback_dir
            && !dirs.contains(fallback)
        {
            dirs.push(fallback.clone());
        }
        dirs
    }

    /// Candidate invocations tried in each directory, program token first.
    #[must_use]
    pub fn candidates(&self) -> Vec<Vec<String>> {
        let name = self.settings.command_name();
        let runner = |program: String| vec![program, String::from("--no-install"), name.to_owned()];
        if self.settings.platform().is_windows() {
            vec![
                vec![format!("{name}.cmd")],
                vec![format!("{name}.exe")],
                runner(format!("{PACKAGE_RUNNER}.cmd")),
                runner(format!("{PACKAGE_RUNNER}.exe")),
                vec![format!("{name}.ps1")],
                runner(format!("{PACKAGE_RUNNER}.ps1")),
            ]
        } else {
            vec![vec![name.to_owned()], runner(PACKAGE_RUNNER.to_owned())]
        }
    }

    fn load_persisted(&self) -> Option<ResolvedBinary> {
        let path = self.settings.resolution_file();
        let content = fs::read_to_string(path).ok()?;
        let argv: Vec<String> = content.lines().map(str::to_owned).collect();
        let program = argv.first()?;
        if Path::new(program).exists() {
            Some(ResolvedBinary::new(argv))
        } else {
            debug!(
                target: RESOLVER_TARGET,
                program = program.as_str(),
                "persisted renderer no longer exists"
            );
            None
        }
    }

    fn persist(&self, binary: &ResolvedBinary) {
        let path = self.settings.resolution_file();
        let result = path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| atomic_write(path, binary.argv().join("\n").as_bytes()));
        if let Err(error) = result {
            warn!(
                target: RESOLVER_TARGET,
                path = %path.display(),
                %error,
                "failed to persist renderer resolution"
            );
        }
    }

    fn search<E>(&self, executor: &E) -> Option<ResolvedBinary>
    where
        E: ProcessExecutor + ?Sized,
    {
        let candidates = self.candidates();
        for dir in self.search_dirs() {
            for candidate in &candidates {
                let Some((program, wrapper)) = candidate.split_first() else {
                    continue;
                };
                let local_bin = dir.join(program);
                if !local_bin.is_file() {
                    continue;
                }
                let mut argv = vec![local_bin.to_string_lossy().into_owned()];
                argv.extend(wrapper.iter().cloned());
                if probe_version(executor, &argv) {
                    return Some(ResolvedBinary::new(argv));
                }
            }
        }
        None
    }

    fn bundled(&self) -> Option<ResolvedBinary> {
        let pattern = self.settings.platform().bundle_glob();
        let matcher = match Glob::new(&pattern) {
            Ok(glob) => glob.compile_matcher(),
            Err(error) => {
                warn!(target: RESOLVER_TARGET, %pattern, %error, "invalid bundle glob");
                return None;
            }
        };
        let entries = fs::read_dir(self.settings.bundle_dir()).ok()?;
        entries
            .flatten()
            .filter(|entry| matcher.is_match(entry.file_name()))
            .map(|entry| entry.path())
            .max_by(|left, right| left.file_name().cmp(&right.file_name()))
            .map(|path| ResolvedBinary::new(vec![path.to_string_lossy().into_owned()]))
    }
}

/// Accepts a candidate whose `--version` exits zero with a version number.
///
/// Stderr is matched ahead of stdout, so a wrapper that prints diagnostics
/// before the version is rejected.
fn probe_version<E>(executor: &E, argv: &[String]) -> bool
where
    E: ProcessExecutor + ?Sized,
{
    let mut probe = argv.to_vec();
    probe.push(String::from("--version"));
    match executor.execute(&probe) {
        ProcessOutcome::Success { stdout, stderr } => {
            let output = format!("{stderr}{stdout}");
            let accepted = VERSION_PATTERN.is_match(output.trim());
            if !accepted {
                debug!(
                    target: RESOLVER_TARGET,
                    ?argv,
                    output = output.trim(),
                    "candidate printed no version number"
                );
            }
            accepted
        }
        outcome => {
            debug!(target: RESOLVER_TARGET, ?argv, ?outcome, "candidate rejected");
            false
        }
    }
}
