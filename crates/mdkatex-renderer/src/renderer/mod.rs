//! The renderer context tying resolution, discovery, and caching together.
//!
//! A [`Renderer`] owns every piece of lazily discovered state: the resolved
//! binary and the option catalog are computed on first use and kept for the
//! renderer's lifetime. Independent renderers never share that state, which
//! keeps tests isolated.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mdkatex_config::Config;
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::cache::RenderCache;
use crate::catalog::{OptionHelp, OptionsCatalog, fetch_help_text};
use crate::command::build_argv;
use crate::error::{RendererError, ResolveError};
use crate::janitor::{self, DEFAULT_RETENTION};
use crate::options::RenderOptions;
use crate::process::{ProcessExecutor, SystemExecutor};
use crate::resolver::{BinaryResolver, ResolvedBinary, ResolverSettings};

/// Tracing target for the renderer context.
const RENDERER_TARGET: &str = "mdkatex_renderer::renderer";

/// Construction parameters for a [`Renderer`].
#[derive(Debug, Clone)]
pub struct RendererSettings {
    resolver: ResolverSettings,
    cache_dir: PathBuf,
    retention: Duration,
}

impl RendererSettings {
    /// Settings caching into `cache_dir` with the default retention and
    /// default resolver behaviour.
    #[must_use]
    pub fn new(cache_dir: impl Into<PathBuf>, bundle_dir: impl Into<PathBuf>) -> Self {
        let cache_root: PathBuf = cache_dir.into();
        Self {
            resolver: ResolverSettings::new(&cache_root, bundle_dir),
            cache_dir: cache_root,
            retention: DEFAULT_RETENTION,
        }
    }

    /// Derives settings from loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let settings = Self::new(
            config.cache_dir().into_std_path_buf(),
            config.bundle_dir().into_std_path_buf(),
        )
        .with_retention(config.retention());
        settings.map_resolver(|resolver| resolver.with_command_name(config.command_name()))
    }

    /// Overrides the cache retention window.
    #[must_use]
    pub const fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Adjusts the resolver settings.
    #[must_use]
    pub fn map_resolver<F>(mut self, adjust: F) -> Self
    where
        F: FnOnce(ResolverSettings) -> ResolverSettings,
    {
        self.resolver = adjust(self.resolver);
        self
    }

    /// Resolver settings.
    #[must_use]
    pub const fn resolver(&self) -> &ResolverSettings {
        &self.resolver
    }

    /// Cache directory.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Cache retention window.
    #[must_use]
    pub const fn retention(&self) -> Duration {
        self.retention
    }
}

/// Renders TeX through an external renderer with on-disk memoization.
#[derive(Debug)]
pub struct Renderer<E = SystemExecutor> {
    resolver: BinaryResolver,
    binary: OnceCell<ResolvedBinary>,
    catalog: OptionsCatalog,
    cache: RenderCache,
    executor: E,
}

impl Renderer<SystemExecutor> {
    /// Builds a renderer spawning real processes, configured from `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            RendererSettings::from_config(config),
            SystemExecutor::new(config.timeout()),
        )
    }
}

impl<E: ProcessExecutor> Renderer<E> {
    /// Creates a renderer running processes through `executor`.
    #[must_use]
    pub fn new(settings: RendererSettings, executor: E) -> Self {
        let RendererSettings {
            resolver,
            cache_dir,
            retention,
        } = settings;
        Self {
            resolver: BinaryResolver::new(resolver),
            binary: OnceCell::new(),
            catalog: OptionsCatalog::new(),
            cache: RenderCache::new(cache_dir, retention),
            executor,
        }
    }

    /// Resolves the renderer binary, reusing the first successful result.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when no renderer can be found. Failures are
    /// not remembered; the next call searches again.
    pub fn resolve(&self) -> Result<&ResolvedBinary, ResolveError> {
        self.binary
            .get_or_try_init(|| self.resolver.resolve(&self.executor))
    }

    /// Returns the options the renderer accepts with their descriptions.
    #[must_use]
    pub fn options_catalog(&self) -> &OptionHelp {
        self.catalog.discover(|| match self.resolve() {
            Ok(binary) => fetch_help_text(binary, &self.executor).map(Some),
            Err(error) => {
                debug!(target: RENDERER_TARGET, %error, "option discovery without a renderer");
                Ok(None)
            }
        })
    }

    /// Renders `text` with `options`, serving repeated requests from cache.
    ///
    /// # Errors
    ///
    /// Returns [`RendererError::Resolve`] when no renderer is available and
    /// [`RendererError::Render`] when rendering fails.
    pub fn render(&self, text: &str, options: &RenderOptions) -> Result<String, RendererError> {
        let binary = self.resolve()?;
        let argv = build_argv(binary, options);
        self.cache
            .render(&self.executor, &argv, text)
            .map_err(RendererError::from)
    }

    /// Removes expired cache entries now; returns how many were removed.
    #[must_use]
    pub fn sweep(&self) -> usize {
        janitor::sweep(self.cache.dir(), self.cache.retention())
    }

    /// The render cache.
    #[must_use]
    pub const fn cache(&self) -> &RenderCache {
        &self.cache
    }

    /// The binary resolver.
    #[must_use]
    pub const fn resolver(&self) -> &BinaryResolver {
        &self.resolver
    }

    /// The process executor.
    #[must_use]
    pub const fn executor(&self) -> &E {
        &self.executor
    }
}
