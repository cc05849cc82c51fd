//! Template discovery and cache-key derivation.
//!
//! Turns the configured [`Source`] into the ordered list of template files
//! for one pass, and gives each file the URL it is registered under in
//! `$templateCache`.
//!
//! ## Ordering
//!
//! - **Pattern**: whatever order the `glob` crate yields, which is
//!   lexicographic within each directory level. Entries that are not regular
//!   files (e.g. directories matched by `**/*`) are skipped. Like shell
//!   globbing, wildcards do not match a leading dot. Directories that
//!   cannot be read while expanding are logged and skipped.
//! - **List**: exactly as given, duplicates included.
//!
//! ## Cache keys
//!
//! A key is the file's path relative to a base directory, prefixed with the
//! configured `root`:
//!
//! ```text
//! pattern  src/app/**/*.html       base  src/app      (static prefix of the pattern)
//! file     src/app/users/list.html  relative  users/list.html
//! root     "tpl"                    key       tpl/users/list.html
//! root     "."                      key       ./users/list.html
//! ```
//!
//! For an explicit list the base is the deepest directory shared by every
//! listed file, unless `base` is configured. Keys always use `/`, whatever
//! the host platform.

use crate::config::Source;
use crate::types::ResolvedFile;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace, warn};

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Invalid glob pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("Cannot determine current directory: {0}")]
    CurrentDir(#[source] io::Error),
}

const MATCH_OPTIONS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Resolve a source into the ordered file list for this pass.
pub fn resolve(source: &Source) -> Result<Vec<PathBuf>, ResolveError> {
    match source {
        Source::Pattern(pattern) => expand(pattern),
        Source::List(files) => Ok(files.iter().map(PathBuf::from).collect()),
    }
}

fn expand(pattern: &str) -> Result<Vec<PathBuf>, ResolveError> {
    let entries =
        glob::glob_with(pattern, MATCH_OPTIONS).map_err(|source| ResolveError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                warn!(
                    path = %err.path().display(),
                    error = %err.error(),
                    "skipping unreadable directory"
                );
                continue;
            }
        };
        if path.is_file() {
            trace!(path = %path.display(), "matched");
            files.push(path);
        } else {
            trace!(path = %path.display(), "skipping non-file match");
        }
    }
    debug!(pattern, count = files.len(), "expanded pattern");
    Ok(files)
}

/// Resolve a source and derive every file's cache key.
pub fn resolve_files(
    source: &Source,
    root: &str,
    base: Option<&str>,
) -> Result<Vec<ResolvedFile>, ResolveError> {
    let paths = resolve(source)?;
    let base = base_dir(source, base);
    debug!(base = %base.display(), "cache keys relative to base");

    paths
        .into_iter()
        .map(|path| {
            let relative = relative_path(&base, &path)?;
            let url = cache_key(root, &relative);
            Ok(ResolvedFile { path, url })
        })
        .collect()
}

/// Directory cache keys are computed against: the explicit `base` if set,
/// else the static prefix of a pattern, else the common ancestor of a list.
pub fn base_dir(source: &Source, base: Option<&str>) -> PathBuf {
    match (base, source) {
        (Some(base), _) => PathBuf::from(base),
        (None, Source::Pattern(pattern)) => PathBuf::from(glob_parent(pattern)),
        (None, Source::List(files)) => common_ancestor(files),
    }
}

/// Static parent directory of a glob pattern.
///
/// - `*.html` → `.`
/// - `src/**/*.html` → `src`
/// - `src/app/home.html` → `src/app`
/// - `src/app/` → `src/app`
pub fn glob_parent(pattern: &str) -> String {
    let pattern = if cfg!(windows) {
        pattern.replace('\\', "/")
    } else {
        pattern.to_string()
    };

    // A trailing separator names the directory itself.
    let mut dir = match pattern.strip_suffix('/') {
        Some(stripped) => {
            let stripped = stripped.trim_end_matches('/');
            if stripped.is_empty() {
                "/".to_string()
            } else {
                stripped.to_string()
            }
        }
        None => posix_dirname(&pattern),
    };
    while has_magic(&dir) {
        dir = posix_dirname(&dir);
    }
    dir
}

/// Wildcards understood by the `glob` crate.
fn has_magic(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

fn posix_dirname(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.starts_with('/') { "/" } else { "." }.to_string();
    }
    match trimmed.rfind('/') {
        None => ".".to_string(),
        Some(idx) => {
            let head = trimmed[..idx].trim_end_matches('/');
            if head.is_empty() {
                "/".to_string()
            } else {
                head.to_string()
            }
        }
    }
}

/// Deepest directory containing every file in `files`, or `.` when they
/// share nothing.
pub fn common_ancestor<P: AsRef<Path>>(files: &[P]) -> PathBuf {
    let mut common: Option<Vec<Component>> = None;
    for file in files {
        let parent: Vec<Component> = file
            .as_ref()
            .parent()
            .map(|p| p.components().filter(|c| *c != Component::CurDir).collect())
            .unwrap_or_default();
        common = Some(match common {
            None => parent,
            Some(prev) => prev
                .into_iter()
                .zip(parent)
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| a)
                .collect(),
        });
    }

    let dir: PathBuf = common.unwrap_or_default().into_iter().collect();
    if dir.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        dir
    }
}

/// Path of `file` relative to `base`, `/`-separated.
///
/// Both sides are resolved against the current directory first, so mixing
/// relative and absolute paths works; files outside `base` get `..` segments.
pub fn relative_path(base: &Path, file: &Path) -> Result<String, ResolveError> {
    let base = lexical_parts(&std::path::absolute(base).map_err(ResolveError::CurrentDir)?);
    let file = lexical_parts(&std::path::absolute(file).map_err(ResolveError::CurrentDir)?);

    let shared = base
        .iter()
        .zip(&file)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts = vec!["..".to_string(); base.len() - shared];
    parts.extend_from_slice(&file[shared..]);
    Ok(parts.join("/"))
}

fn lexical_parts(path: &Path) -> Vec<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => {
                parts.push(prefix.as_os_str().to_string_lossy().into_owned())
            }
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                parts.pop();
            }
            Component::Normal(name) => parts.push(name.to_string_lossy().into_owned()),
        }
    }
    parts
}

/// Join `root` and a relative path into a cache key.
///
/// A `root` of `.` or starting with `./` keeps a leading `./` that plain
/// joining would normalize away.
pub fn cache_key(root: &str, relative: &str) -> String {
    let joined = [root, relative]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    let url = posix_normalize(&joined);
    if root == "." || root.starts_with("./") {
        format!("./{url}")
    } else {
        url
    }
}

fn posix_normalize(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let absolute = path.starts_with('/');
    let trailing = path.ends_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            name => parts.push(name),
        }
    }

    let mut out = parts.join("/");
    if absolute {
        out.insert(0, '/');
    }
    if out.is_empty() {
        return ".".to_string();
    }
    if trailing && !out.ends_with('/') {
        out.push('/');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{list_in, pattern_in, write_templates};

    // =========================================================================
    // glob_parent
    // =========================================================================

    #[test]
    fn glob_parent_of_bare_wildcard_is_cwd() {
        assert_eq!(glob_parent("*.html"), ".");
    }

    #[test]
    fn glob_parent_stops_at_first_magic_segment() {
        assert_eq!(glob_parent("src/**/*.html"), "src");
        assert_eq!(glob_parent("src/app/*.html"), "src/app");
        assert_eq!(glob_parent("src/[ab]/views/*.html"), "src");
        assert_eq!(glob_parent("src/v?/x.html"), "src");
    }

    #[test]
    fn glob_parent_of_plain_path_is_its_directory() {
        assert_eq!(glob_parent("a/b/x.html"), "a/b");
        assert_eq!(glob_parent("x.html"), ".");
    }

    #[test]
    fn glob_parent_trailing_slash_is_the_directory() {
        assert_eq!(glob_parent("src/app/"), "src/app");
        assert_eq!(glob_parent("src/*/"), "src");
    }

    #[test]
    fn glob_parent_braces_and_parens_are_literal() {
        // The matcher has no brace expansion or backslash escapes, so
        // neither ends the static prefix.
        assert_eq!(glob_parent("src/{a,b}/*.html"), "src/{a,b}");
        assert_eq!(glob_parent("src/(x)/a.html"), "src/(x)");
        assert_eq!(glob_parent("src/[*]x/a.html"), "src");
    }

    #[test]
    fn glob_parent_absolute() {
        assert_eq!(glob_parent("/srv/app/**/*.html"), "/srv/app");
        assert_eq!(glob_parent("/*.html"), "/");
    }

    // =========================================================================
    // common_ancestor
    // =========================================================================

    #[test]
    fn common_ancestor_of_siblings() {
        assert_eq!(
            common_ancestor(&["a/b/x.html", "a/b/y.html"]),
            PathBuf::from("a/b")
        );
    }

    #[test]
    fn common_ancestor_multi_level() {
        assert_eq!(
            common_ancestor(&["a/b/c/x.html", "a/b/d/e/y.html", "a/b/z.html"]),
            PathBuf::from("a/b")
        );
        assert_eq!(
            common_ancestor(&["a/b/c/x.html", "a/d/y.html"]),
            PathBuf::from("a")
        );
    }

    #[test]
    fn common_ancestor_disjoint_is_cwd() {
        assert_eq!(common_ancestor(&["a/x.html", "b/y.html"]), PathBuf::from("."));
        assert_eq!(common_ancestor(&["x.html"]), PathBuf::from("."));
        assert_eq!(common_ancestor::<&str>(&[]), PathBuf::from("."));
    }

    #[test]
    fn common_ancestor_ignores_leading_dot_segment() {
        assert_eq!(
            common_ancestor(&["./a/x.html", "a/y.html"]),
            PathBuf::from("a")
        );
    }

    // =========================================================================
    // relative_path / cache_key
    // =========================================================================

    #[test]
    fn relative_path_descendant() {
        let rel = relative_path(Path::new("a"), Path::new("a/b/x.html")).unwrap();
        assert_eq!(rel, "b/x.html");
    }

    #[test]
    fn relative_path_sibling_directory() {
        let rel = relative_path(Path::new("a/b"), Path::new("a/c/x.html")).unwrap();
        assert_eq!(rel, "../c/x.html");
    }

    #[test]
    fn relative_path_from_cwd() {
        assert_eq!(
            relative_path(Path::new("."), Path::new("./x.html")).unwrap(),
            "x.html"
        );
    }

    #[test]
    fn relative_path_mixes_absolute_and_relative() {
        let cwd = std::env::current_dir().unwrap();
        let rel = relative_path(&cwd, Path::new("views/x.html")).unwrap();
        assert_eq!(rel, "views/x.html");
    }

    #[test]
    fn cache_key_joins_root() {
        assert_eq!(cache_key("tpl", "b/x.html"), "tpl/b/x.html");
        assert_eq!(cache_key("/static/", "x.html"), "/static/x.html");
        assert_eq!(cache_key("", "x.html"), "x.html");
    }

    #[test]
    fn cache_key_keeps_explicit_dot_root() {
        assert_eq!(cache_key(".", "x.html"), "./x.html");
        assert_eq!(cache_key("./", "x.html"), "./x.html");
        assert_eq!(cache_key("./app", "views/x.html"), "./app/views/x.html");
    }

    #[test]
    fn cache_key_normalizes_parent_segments() {
        assert_eq!(cache_key("tpl", "../x.html"), "x.html");
        assert_eq!(cache_key("", "../x.html"), "../x.html");
        assert_eq!(cache_key("tpl/./a", "b/../x.html"), "tpl/a/x.html");
    }

    // =========================================================================
    // resolve / resolve_files
    // =========================================================================

    #[test]
    fn list_source_returned_unchanged() {
        let source = Source::List(vec!["z.html".into(), "a.html".into(), "z.html".into()]);
        let files = resolve(&source).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("z.html"),
                PathBuf::from("a.html"),
                PathBuf::from("z.html")
            ]
        );
    }

    #[test]
    fn pattern_matches_files_in_glob_order() {
        let tmp = write_templates(&[
            ("app/b.html", ""),
            ("app/a.html", ""),
            ("app/nested/c.html", ""),
            ("app/notes.txt", ""),
        ]);
        let files = resolve(&pattern_in(&tmp, "app/**/*.html")).unwrap();
        let rel: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(tmp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            rel,
            vec![
                PathBuf::from("app/a.html"),
                PathBuf::from("app/b.html"),
                PathBuf::from("app/nested/c.html"),
            ]
        );
    }

    #[test]
    fn pattern_skips_directories_and_dotfiles() {
        let tmp = write_templates(&[("app/x.html", ""), ("app/.hidden.html", ""), ("app/d.html/inner", "")]);
        let files = resolve(&pattern_in(&tmp, "app/*")).unwrap();
        assert_eq!(files, vec![tmp.path().join("app/x.html")]);
    }

    #[cfg(unix)]
    #[test]
    fn pattern_skips_unreadable_directories() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = write_templates(&[("app/ok.html", ""), ("app/locked/x.html", "")]);
        let locked = tmp.path().join("app/locked");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        let result = resolve(&pattern_in(&tmp, "app/**/*.html"));

        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        let files = result.unwrap();
        assert!(files.contains(&tmp.path().join("app/ok.html")));
        // Root can still read the directory; everyone else gets it skipped.
        assert!(files.len() <= 2);
    }

    #[test]
    fn pattern_without_matches_is_empty() {
        let tmp = write_templates(&[]);
        let files = resolve(&pattern_in(&tmp, "**/*.html")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn pattern_keys_relative_to_static_prefix() {
        let tmp = write_templates(&[("src/app/home.html", ""), ("src/app/users/list.html", "")]);
        let files = resolve_files(&pattern_in(&tmp, "src/app/**/*.html"), "tpl", None).unwrap();
        let urls: Vec<_> = files.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(urls, vec!["tpl/home.html", "tpl/users/list.html"]);
    }

    #[test]
    fn pattern_keys_with_dot_root() {
        let tmp = write_templates(&[("views/x.html", "")]);
        let files = resolve_files(&pattern_in(&tmp, "views/*.html"), ".", None).unwrap();
        assert_eq!(files[0].url, "./x.html");
    }

    #[test]
    fn list_keys_relative_to_explicit_base() {
        let source = Source::List(vec!["a/b/x.html".into(), "a/b/y.html".into()]);
        let files = resolve_files(&source, "tpl", Some("a")).unwrap();
        let urls: Vec<_> = files.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(urls, vec!["tpl/b/x.html", "tpl/b/y.html"]);
    }

    #[test]
    fn list_keys_relative_to_common_ancestor() {
        let source = Source::List(vec!["a/b/x.html".into(), "a/b/y.html".into()]);
        let files = resolve_files(&source, "tpl", None).unwrap();
        assert_eq!(files[0].url, "tpl/x.html");
        assert_eq!(files[1].url, "tpl/y.html");
    }

    #[test]
    fn list_keys_nested_common_ancestor() {
        let tmp = write_templates(&[]);
        let source = list_in(&tmp, &["web/a/b/x.html", "web/a/c/d/y.html"]);
        let files = resolve_files(&source, "", None).unwrap();
        let urls: Vec<_> = files.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(urls, vec!["b/x.html", "c/d/y.html"]);
    }

    #[test]
    fn explicit_base_overrides_pattern_prefix() {
        let tmp = write_templates(&[("src/app/home.html", "")]);
        let base = tmp.path().join("src").to_string_lossy().into_owned();
        let files = resolve_files(&pattern_in(&tmp, "src/app/*.html"), "", Some(&base)).unwrap();
        assert_eq!(files[0].url, "app/home.html");
    }
}
