//! Assembly of the generated template-cache module.
//!
//! One [`TemplateCache`] is built per configuration. Each call to
//! [`TemplateCache::assemble`] is a full pass:
//!
//! ```text
//! resolve   source  →  [ResolvedFile]         (fresh glob / list every pass)
//! render    header                             module, standalone
//!           for each file: read → escape → body  url, contents, file
//!           footer
//! join      one fragment per line             →  Assembly { files, output }
//! ```
//!
//! Files are re-read on every pass with no staleness check; two passes see
//! different content if a template changed in between. Any unreadable file
//! aborts the pass before anything is returned, so callers never see a
//! module with templates silently missing.
//!
//! Output is a pure function of the file list, file contents and
//! configuration: the same inputs produce byte-identical modules.

use crate::config::{CacheConfig, ConfigError};
use crate::escape::escape;
use crate::resolve::{self, ResolveError};
use crate::template::{Slot, Template};
use crate::types::{Asset, ResolvedFile};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Header value of `standalone` when the module declares its dependencies.
pub const STANDALONE_SUFFIX: &str = ", []";

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),
    #[error("Cannot read template {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result of one pass: the files that went in and the module that came out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub files: Vec<ResolvedFile>,
    pub output: String,
}

/// A configured generator. Immutable; every pass starts from scratch.
#[derive(Debug, Clone)]
pub struct TemplateCache {
    config: CacheConfig,
    header: Template,
    body: Template,
    footer: Template,
}

impl TemplateCache {
    /// Validate `config` and compile its three templates.
    pub fn new(config: CacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let header = Template::compile(&config.template_header, Slot::Header);
        let body = Template::compile(&config.template_body, Slot::Body);
        let footer = Template::compile(&config.template_footer, Slot::Footer);
        debug!(
            header = ?header.references(),
            body = ?body.references(),
            footer = ?footer.references(),
            "compiled templates"
        );
        Ok(Self {
            config,
            header,
            body,
            footer,
        })
    }

    /// Current file list with cache keys.
    pub fn resolve(&self) -> Result<Vec<ResolvedFile>, AssembleError> {
        let files = resolve::resolve_files(
            &self.config.source,
            &self.config.root,
            self.config.base.as_deref(),
        )?;
        debug!(count = files.len(), "resolved templates");
        Ok(files)
    }

    /// Render the module for an already-resolved file list.
    pub fn render(&self, files: &[ResolvedFile]) -> Result<String, AssembleError> {
        let standalone = if self.config.standalone {
            STANDALONE_SUFFIX
        } else {
            ""
        };

        let mut output = self.header.render(&[
            ("module", self.config.module.as_str()),
            ("standalone", standalone),
        ]);
        output.push('\n');

        for file in files {
            let contents = read_template(&file.path)?;
            let escaped = escape(&contents, &self.config.escape_options);
            let path = file.path.to_string_lossy();
            trace!(url = %file.url, bytes = contents.len(), "rendering template");
            output.push_str(&self.body.render(&[
                ("url", file.url.as_str()),
                ("contents", escaped.as_str()),
                ("file", &*path),
            ]));
            output.push('\n');
        }

        output.push_str(&self.footer.render(&[]));
        output.push('\n');
        Ok(output)
    }

    /// Run a full pass: resolve, then render.
    pub fn assemble(&self) -> Result<Assembly, AssembleError> {
        let files = self.resolve()?;
        let output = self.render(&files)?;
        info!(
            module = %self.config.module,
            templates = files.len(),
            bytes = output.len(),
            "assembled template cache"
        );
        Ok(Assembly { files, output })
    }

    /// Wrap rendered output as the configured artifact.
    pub fn asset(&self, output: String) -> Asset {
        Asset {
            filename: self.config.output_filename.clone(),
            content: output,
        }
    }
}

/// Invalid UTF-8 sequences are replaced with U+FFFD rather than failing.
fn read_template(path: &std::path::Path) -> Result<String, AssembleError> {
    let bytes = std::fs::read(path).map_err(|source| AssembleError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            warn!(path = %path.display(), "template is not valid UTF-8; decoding lossily");
            Ok(String::from_utf8_lossy(err.as_bytes()).into_owned())
        }
    }
}
