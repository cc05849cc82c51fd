//! # ng-template-cache
//!
//! Compiles a set of HTML templates into one JavaScript file that registers
//! every template in AngularJS's `$templateCache`, so the app never fetches
//! a template over the network at runtime.
//!
//! ```text
//! src/app/home.html          angular.module('templates').run(['$templateCache', function($templateCache) {
//! src/app/users/list.html →  $templateCache.put('home.html','<h1>Home</h1>');
//!                            $templateCache.put('users/list.html','<ul>...</ul>');
//!                            }]);
//! ```
//!
//! # Architecture: One Pass, Four Steps
//!
//! ```text
//! 1. Resolve   source   →  [ResolvedFile]   (glob or explicit list, cache key per file)
//! 2. Escape    contents →  literal body     (per file)
//! 3. Render    header / body × N / footer   (<%= var %> substitution)
//! 4. Emit      module   →  build host       (dependencies + one artifact)
//! ```
//!
//! Configuration is validated and the three templates compiled once, in
//! [`TemplateCache::new`]. Every pass after that starts from the filesystem:
//! nothing is cached between passes, so a rebuild always reflects the
//! templates as they are now.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Config file loading (TOML/JSON), defaults, validation, stock config |
//! | [`resolve`] | Glob expansion, explicit lists, base directory and cache-key derivation |
//! | [`escape`] | Template text → JavaScript string-literal body |
//! | [`template`] | `<%= name %>` substitution with a closed variable set per slot |
//! | [`assemble`] | [`TemplateCache`]: one resolve + render pass |
//! | [`host`] | [`BuildHost`](host::BuildHost) boundary, directory and Cargo build-script hosts |
//! | [`types`] | Shared types (`ResolvedFile`, `Asset`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Deterministic Output
//!
//! The generated module is a pure function of the file list, the file
//! contents and the configuration. Glob results come back in a fixed order,
//! list sources keep their given order, and the escaper has no
//! configuration-independent choices. Identical inputs give byte-identical
//! output, so the artifact can be content-hashed and cached downstream.
//!
//! ## Closed-Set Templating
//!
//! The header, body and footer are user-editable strings, but each can only
//! see a fixed set of variables. There is no expression language to get
//! wrong; an unknown `<%= name %>` stays in the output as written.
//!
//! ## Fail the Pass, Not the Template
//!
//! A template that can't be read (missing, unreadable) fails the
//! whole pass and nothing is emitted. A cache module with a silently missing
//! template only fails later, in the browser.

pub mod assemble;
pub mod config;
pub mod escape;
pub mod host;
pub mod output;
pub mod resolve;
pub mod template;
pub mod types;

pub use assemble::{AssembleError, Assembly, TemplateCache};
pub use config::{CacheConfig, ConfigError, Source};

#[cfg(test)]
pub(crate) mod test_helpers;
