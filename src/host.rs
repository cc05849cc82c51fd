//! Build-tool integration.
//!
//! A [`BuildHost`] is whatever is driving the generator: it learns which
//! files the output depends on and receives the finished artifact. A pass
//! ([`run_pass`]) is:
//!
//! 1. resolve the current template list,
//! 2. declare every template as an input dependency,
//! 3. render the module,
//! 4. emit it, exactly once, under the configured output filename.
//!
//! Dependencies are declared before rendering so a host that tracks them
//! (Cargo's `rerun-if-changed`) re-runs the step once a missing template
//! shows up. If rendering fails nothing is emitted.
//!
//! Two hosts ship with the crate:
//!
//! | Host | Dependencies | Artifact |
//! |------|--------------|----------|
//! | [`DirHost`] | recorded in memory | written under an output directory |
//! | [`CargoHost`] | `cargo:rerun-if-changed=` lines | written under `OUT_DIR` |
//!
//! `CargoHost` lets a crate embed its templates from `build.rs`:
//!
//! ```rust,no_run
//! use ng_template_cache::{CacheConfig, Source, TemplateCache};
//! use ng_template_cache::host::{CargoHost, run_pass};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = TemplateCache::new(CacheConfig::new(Source::Pattern(
//!         "web/app/**/*.html".into(),
//!     )))?;
//!     run_pass(&cache, &mut CargoHost::from_env()?)?;
//!     Ok(())
//! }
//! ```

use crate::assemble::{AssembleError, TemplateCache};
use crate::types::{Asset, ResolvedFile};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum HostError {
    #[error("Cannot write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("Cannot write build directive: {0}")]
    Directive(#[source] io::Error),
    #[error("OUT_DIR is not set; CargoHost only works inside a build script")]
    MissingOutDir,
}

#[derive(Error, Debug)]
pub enum PassError {
    #[error(transparent)]
    Assemble(#[from] AssembleError),
    #[error(transparent)]
    Host(#[from] HostError),
}

/// The build system side of a pass.
pub trait BuildHost {
    /// Declare `path` as an input of the generated artifact.
    fn add_dependency(&mut self, path: &Path) -> Result<(), HostError>;

    /// Receive the finished artifact. Called once per successful pass.
    fn emit_asset(&mut self, asset: Asset) -> Result<(), HostError>;
}

/// What a successful pass produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub files: Vec<ResolvedFile>,
    pub filename: String,
    pub size: usize,
    pub digest: String,
}

/// Run one full pass of `cache` against `host`.
pub fn run_pass<H: BuildHost + ?Sized>(
    cache: &TemplateCache,
    host: &mut H,
) -> Result<PassReport, PassError> {
    let files = cache.resolve()?;
    for file in &files {
        host.add_dependency(&file.path)?;
    }

    let output = cache.render(&files)?;
    let asset = cache.asset(output);
    let report = PassReport {
        files,
        filename: asset.filename.clone(),
        size: asset.size(),
        digest: asset.digest(),
    };
    host.emit_asset(asset)?;

    info!(
        filename = %report.filename,
        size = report.size,
        templates = report.files.len(),
        "emitted template cache"
    );
    Ok(report)
}

fn write_asset(out_dir: &Path, asset: &Asset) -> Result<PathBuf, HostError> {
    let path = out_dir.join(&asset.filename);
    let write_err = |source| HostError::Write {
        path: path.clone(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(&path, &asset.content).map_err(write_err)?;
    debug!(path = %path.display(), bytes = asset.size(), "wrote artifact");
    Ok(path)
}

/// Writes artifacts under a directory and remembers declared dependencies.
#[derive(Debug, Clone)]
pub struct DirHost {
    out_dir: PathBuf,
    dependencies: Vec<PathBuf>,
    written: Vec<PathBuf>,
}

impl DirHost {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            dependencies: Vec::new(),
            written: Vec::new(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Files declared as inputs, in declaration order.
    pub fn dependencies(&self) -> &[PathBuf] {
        &self.dependencies
    }

    /// Artifacts written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl BuildHost for DirHost {
    fn add_dependency(&mut self, path: &Path) -> Result<(), HostError> {
        self.dependencies.push(path.to_path_buf());
        Ok(())
    }

    fn emit_asset(&mut self, asset: Asset) -> Result<(), HostError> {
        let path = write_asset(&self.out_dir, &asset)?;
        self.written.push(path);
        Ok(())
    }
}

/// Host for Cargo build scripts.
///
/// Dependencies become `cargo:rerun-if-changed=` directives on `directives`
/// (stdout for a real build script); the artifact lands in `out_dir`, ready
/// for `include_str!(concat!(env!("OUT_DIR"), "/templates.js"))`.
#[derive(Debug)]
pub struct CargoHost<W: Write> {
    out_dir: PathBuf,
    directives: W,
}

impl CargoHost<io::Stdout> {
    /// Host for the running build script, using `OUT_DIR` and stdout.
    pub fn from_env() -> Result<Self, HostError> {
        let out_dir = std::env::var_os("OUT_DIR").ok_or(HostError::MissingOutDir)?;
        Ok(Self::new(out_dir, io::stdout()))
    }
}

impl<W: Write> CargoHost<W> {
    pub fn new(out_dir: impl Into<PathBuf>, directives: W) -> Self {
        Self {
            out_dir: out_dir.into(),
            directives,
        }
    }

    pub fn into_directives(self) -> W {
        self.directives
    }
}

impl<W: Write> BuildHost for CargoHost<W> {
    fn add_dependency(&mut self, path: &Path) -> Result<(), HostError> {
        writeln!(self.directives, "cargo:rerun-if-changed={}", path.display())
            .map_err(HostError::Directive)
    }

    fn emit_asset(&mut self, asset: Asset) -> Result<(), HostError> {
        write_asset(&self.out_dir, &asset)?;
        Ok(())
    }
}
