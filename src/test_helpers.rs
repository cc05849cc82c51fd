//! Shared test utilities for the ng-template-cache test suite.
//!
//! Provides fixture builders for template trees on disk and helpers that read
//! generated modules back: a JavaScript string-literal decoder and an
//! extractor for `$templateCache.put(...)` calls.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = write_templates(&[("app/home.html", "<h1>Home</h1>")]);
//! let output = cache_for(pattern_in(&tmp, "app/**/*.html")).assemble().unwrap().output;
//!
//! assert_eq!(put_calls(&output), vec![("home.html".into(), "<h1>Home</h1>".into())]);
//! ```

use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;
use tempfile::TempDir;

use crate::assemble::TemplateCache;
use crate::config::{CacheConfig, Source};

// =========================================================================
// Fixture setup
// =========================================================================

/// Write `(relative path, contents)` pairs into a fresh temp directory.
pub fn write_templates(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_into(tmp.path(), files);
    tmp
}

/// Write `(relative path, contents)` pairs under `dir`, creating parents.
pub fn write_into(dir: &Path, files: &[(&str, &str)]) {
    for (rel, contents) in files {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
    }
}

/// Absolute glob pattern rooted in a temp directory.
pub fn pattern_in(tmp: &TempDir, pattern: &str) -> Source {
    Source::Pattern(tmp.path().join(pattern).to_string_lossy().into_owned())
}

/// Absolute explicit file list rooted in a temp directory.
pub fn list_in(tmp: &TempDir, files: &[&str]) -> Source {
    Source::List(
        files
            .iter()
            .map(|f| tmp.path().join(f).to_string_lossy().into_owned())
            .collect(),
    )
}

/// Generator with stock settings for the given source.
pub fn cache_for(source: Source) -> TemplateCache {
    TemplateCache::new(CacheConfig::new(source)).unwrap()
}

// =========================================================================
// Reading generated output back
// =========================================================================

/// Decode the body of a JavaScript string literal (no surrounding quotes).
///
/// Panics on malformed escapes so a broken escaper fails loudly.
pub fn unescape_js(literal: &str) -> String {
    let mut units: Vec<u16> = Vec::with_capacity(literal.len());
    let mut chars = literal.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u16; 2];
            units.extend_from_slice(c.encode_utf16(&mut buf));
            continue;
        }
        let escaped = chars.next().expect("dangling backslash");
        let cp = match escaped {
            'b' => 0x8,
            'f' => 0xC,
            'n' => 0xA,
            'r' => 0xD,
            't' => 0x9,
            'v' => 0xB,
            '0' => {
                assert!(
                    !chars.peek().is_some_and(|n| n.is_ascii_digit()),
                    "legacy octal escape"
                );
                0
            }
            'x' => read_hex(&mut chars, 2),
            'u' if chars.peek() == Some(&'{') => {
                chars.next();
                let digits: String = chars.by_ref().take_while(|&d| d != '}').collect();
                u32::from_str_radix(&digits, 16).unwrap()
            }
            'u' => read_hex(&mut chars, 4),
            other => other as u32,
        };
        match char::from_u32(cp) {
            Some(ch) => {
                let mut buf = [0u16; 2];
                units.extend_from_slice(ch.encode_utf16(&mut buf));
            }
            // Half of a surrogate pair; reassembled by the UTF-16 decode below.
            None => units.push(cp as u16),
        }
    }

    String::from_utf16(&units).expect("literal decodes to valid UTF-16")
}

fn read_hex(chars: &mut Peekable<Chars<'_>>, n: usize) -> u32 {
    let digits: String = (0..n).map(|_| chars.next().unwrap()).collect();
    u32::from_str_radix(&digits, 16).unwrap_or_else(|_| panic!("bad hex escape {digits}"))
}

/// All `$templateCache.put('<url>','<contents>');` calls in a generated
/// module, with both arguments decoded.
pub fn put_calls(output: &str) -> Vec<(String, String)> {
    output
        .lines()
        .filter_map(|line| {
            let args = line
                .strip_prefix("$templateCache.put('")?
                .strip_suffix("');")?;
            let (url, contents) = args.split_once("','")?;
            Some((unescape_js(url), unescape_js(contents)))
        })
        .collect()
}

/// Just the URLs of [`put_calls`], in output order.
pub fn put_urls(output: &str) -> Vec<String> {
    put_calls(output).into_iter().map(|(url, _)| url).collect()
}
