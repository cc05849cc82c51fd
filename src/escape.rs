//! String-literal escaping for template contents.
//!
//! Template files are embedded in the generated module as quoted JavaScript
//! string literals, so their text has to be rewritten into something a JS
//! parser reads back as the exact same string.
//!
//! ## Options
//!
//! The knobs are the string options of the `jsesc` escaper that front-end
//! build tools expose for this job:
//!
//! ```toml
//! [escapeOptions]
//! quotes = "single"         # single | double | backtick (the quote that gets escaped)
//! wrap = false              # surround the result with the chosen quote
//! minimal = false           # only escape what a literal strictly requires
//! es6 = false               # astral symbols as \u{1F600} instead of surrogate pairs
//! json = false              # JSON-compatible output (forces double quotes + wrap)
//! isScriptContext = false   # break up `</script` and `<!--`
//! lowercaseHex = false      # \xab instead of \xAB
//! escapeEverything = false  # escape printable ASCII too
//! ```
//!
//! `compact`, `indent`, `indentLevel` and `numbers` are accepted so existing
//! `escapeOptions` blocks load, but they only affect non-string values and
//! are ignored here.
//! Unknown keys are rejected when the config is loaded.
//!
//! ## Output
//!
//! Without `minimal`, everything outside printable ASCII is escaped, which
//! keeps the generated file pure ASCII regardless of template encoding:
//!
//! ```text
//! it's        →  it\'s
//! a\b         →  a\\b
//! line<LF>    →  line\n
//! café        →  caf\xE9
//! →           →  \u2192
//! 😀          →  \uD83D\uDE00
//! ```

use serde::{Deserialize, Serialize};

/// Quote character the literal will be wrapped in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quotes {
    #[default]
    Single,
    Double,
    Backtick,
}

impl Quotes {
    pub fn as_char(self) -> char {
        match self {
            Quotes::Single => '\'',
            Quotes::Double => '"',
            Quotes::Backtick => '`',
        }
    }
}

/// Escaping knobs, configured under `escapeOptions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EscapeOptions {
    pub quotes: Quotes,
    pub wrap: bool,
    pub minimal: bool,
    pub es6: bool,
    pub json: bool,
    pub is_script_context: bool,
    pub lowercase_hex: bool,
    pub escape_everything: bool,

    // No effect on strings.
    pub compact: Option<bool>,
    pub indent: Option<String>,
    pub indent_level: Option<u32>,
    pub numbers: Option<String>,
}

impl EscapeOptions {
    /// JSON output only has double-quoted strings.
    fn quote(&self) -> char {
        if self.json {
            '"'
        } else {
            self.quotes.as_char()
        }
    }

    fn wraps(&self) -> bool {
        self.wrap || self.json
    }
}

/// Escape `text` so it can sit between quotes in generated JavaScript.
pub fn escape(text: &str, options: &EscapeOptions) -> String {
    let quote = options.quote();
    let mut out = String::with_capacity(text.len() + text.len() / 8 + 2);

    if options.wraps() {
        out.push(quote);
    }

    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);
        match c {
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' if !options.json && !next.is_some_and(|n| n.is_ascii_digit()) => {
                out.push_str("\\0")
            }
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            '\'' | '"' | '`' if options.escape_everything && !options.json => {
                out.push('\\');
                out.push(c);
            }
            c if options.escape_everything => push_code_point(&mut out, c as u32, options),
            // `${` would open an interpolation inside a template literal.
            '$' if quote == '`' && next == Some('{') => out.push_str("\\$"),
            '<' if options.is_script_context && closes_script(&text[i..]) => {
                out.push_str("<\\/");
                chars.next();
            }
            '<' if options.is_script_context && text[i..].starts_with("<!--") => {
                push_code_unit(&mut out, 0x3C, options);
            }
            '\u{2028}' | '\u{2029}' => push_code_unit(&mut out, c as u32, options),
            c if c.is_ascii_control() => push_code_unit(&mut out, c as u32, options),
            c if c.is_ascii() || options.minimal => out.push(c),
            c => push_code_point(&mut out, c as u32, options),
        }
    }

    if options.wraps() {
        out.push(quote);
    }
    out
}

/// `</script` or `</style`, case-insensitively.
fn closes_script(rest: &str) -> bool {
    let Some(tag) = rest.strip_prefix("</") else {
        return false;
    };
    ["script", "style"].iter().any(|name| {
        tag.get(..name.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(name))
    })
}

fn push_hex(out: &mut String, value: u32, width: usize, options: &EscapeOptions) {
    if options.lowercase_hex {
        out.push_str(&format!("{value:0width$x}"));
    } else {
        out.push_str(&format!("{value:0width$X}"));
    }
}

/// A single UTF-16 code unit: `\xHH` when it fits (never in JSON), else `\uHHHH`.
fn push_code_unit(out: &mut String, unit: u32, options: &EscapeOptions) {
    if unit <= 0xFF && !options.json {
        out.push_str("\\x");
        push_hex(out, unit, 2, options);
    } else {
        out.push_str("\\u");
        push_hex(out, unit, 4, options);
    }
}

fn push_code_point(out: &mut String, cp: u32, options: &EscapeOptions) {
    if cp <= 0xFFFF {
        push_code_unit(out, cp, options);
    } else if options.es6 && !options.json {
        out.push_str("\\u{");
        push_hex(out, cp, 1, options);
        out.push('}');
    } else {
        let offset = cp - 0x10000;
        push_code_unit(out, 0xD800 + (offset >> 10), options);
        push_code_unit(out, 0xDC00 + (offset & 0x3FF), options);
    }
}
