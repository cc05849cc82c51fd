//! Minimal `<%= name %>` substitution for the header, body and footer templates.
//!
//! The three templates are user-overridable strings, so rendering is kept
//! deliberately small: a marker is `<%=`, optional whitespace, an identifier,
//! optional whitespace, `%>`. Nothing else is interpreted; there are no
//! expressions, loops or escaping rules.
//!
//! Each template slot has a closed set of variables:
//!
//! | Slot | Variables |
//! |------|-----------|
//! | header | `module`, `standalone` |
//! | body | `url`, `contents`, `file` |
//! | footer | (none) |
//!
//! A marker naming anything outside its slot's set is left in the output
//! verbatim instead of failing the build.

use regex::Regex;
use std::sync::LazyLock;

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<%=\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*%>").expect("marker regex is valid")
});

/// Which of the three generated-module templates a string fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Header,
    Body,
    Footer,
}

impl Slot {
    /// Variable names a template in this slot may reference.
    pub fn variables(self) -> &'static [&'static str] {
        match self {
            Slot::Header => &["module", "standalone"],
            Slot::Body => &["url", "contents", "file"],
            Slot::Footer => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Var(&'static str),
}

/// A template string split into literal text and variable references.
///
/// Compiled once when the generator is built and rendered once per file.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn compile(source: &str, slot: Slot) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut last = 0;

        for caps in MARKER.captures_iter(source) {
            let whole = caps.get(0).expect("capture 0 is the whole match");
            let name = &caps[1];
            match slot.variables().iter().find(|v| **v == name) {
                Some(var) => {
                    literal.push_str(&source[last..whole.start()]);
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Var(*var));
                }
                // Unknown to this slot: keep the marker as plain text.
                None => literal.push_str(&source[last..whole.end()]),
            }
            last = whole.end();
        }
        literal.push_str(&source[last..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self { segments }
    }

    /// Variables this template actually references, in order of appearance.
    pub fn references(&self) -> Vec<&'static str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Var(name) => Some(*name),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Substitute `vars` into the template. A slot variable missing from
    /// `vars` renders as the empty string.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Var(name) => {
                    if let Some((_, value)) = vars.iter().find(|(k, _)| k == name) {
                        out.push_str(value);
                    }
                }
            }
        }
        out
    }
}
