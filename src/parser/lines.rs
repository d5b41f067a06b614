//! Classification of single feature text lines.

use crate::feature::StepType;

/// Kind of a single trimmed line of feature text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Line<'a> {
    /// Empty line or `#` comment.
    Skip,

    /// `@tag1 @tag2` line, tags without the `@`.
    Tags(Vec<&'a str>),

    /// `Feature:` header with the (possibly empty) name.
    Feature(&'a str),

    /// `Background:` header.
    Background,

    /// `Scenario:`/`Example:` or, if `outline`, `Scenario Outline:`/
    /// `Scenario Template:` header.
    Scenario {
        /// Scenario name.
        name: &'a str,

        /// Whether the header opens an outline.
        outline: bool,
    },

    /// `Examples:`/`Scenarios:` header.
    Examples,

    /// Step line.
    Step {
        /// Keyword as written.
        keyword: &'a str,

        /// Explicit [`StepType`], [`None`] for `And`, `But` and `*`.
        ty: Option<StepType>,

        /// Step text.
        text: &'a str,
    },

    /// Pipe-delimited table row with unescaped and trimmed cells.
    Row(Vec<String>),

    /// Anything else.
    Text(&'a str),
}

/// Headers in the order they must be tried, so longer ones win.
const SCENARIO_HEADERS: &[(&str, bool)] = &[
    ("Scenario Outline:", true),
    ("Scenario Template:", true),
    ("Scenario:", false),
    ("Example:", false),
];

const EXAMPLES_HEADERS: &[&str] = &["Examples:", "Scenarios:"];

const STEP_KEYWORDS: &[(&str, Option<StepType>)] = &[
    ("Given", Some(StepType::Given)),
    ("When", Some(StepType::When)),
    ("Then", Some(StepType::Then)),
    ("And", None),
    ("But", None),
    ("*", None),
];

/// Classifies the given `raw` line.
pub(crate) fn classify(raw: &str) -> Line<'_> {
    let line = raw.trim();

    if line.is_empty() || line.starts_with('#') {
        return Line::Skip;
    }
    if line.starts_with('|') {
        return Line::Row(split_row(line));
    }
    if line.starts_with('@') {
        if let Some(tags) = tags(line) {
            return Line::Tags(tags);
        }
    }
    if let Some(name) = line.strip_prefix("Feature:") {
        return Line::Feature(name.trim());
    }
    if line.starts_with("Background:") {
        return Line::Background;
    }
    for &(header, outline) in SCENARIO_HEADERS {
        if let Some(name) = line.strip_prefix(header) {
            return Line::Scenario {
                name: name.trim(),
                outline,
            };
        }
    }
    if EXAMPLES_HEADERS.iter().any(|h| line.starts_with(h)) {
        return Line::Examples;
    }
    for &(keyword, ty) in STEP_KEYWORDS {
        if let Some(rest) = line.strip_prefix(keyword) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return Line::Step {
                    keyword,
                    ty,
                    text: rest.trim(),
                };
            }
        }
    }
    Line::Text(line)
}

/// Parses a line of whitespace separated `@tag`s, stopping at a `#` comment.
fn tags(line: &str) -> Option<Vec<&str>> {
    line.split_whitespace()
        .take_while(|t| !t.starts_with('#'))
        .map(|t| t.strip_prefix('@').filter(|t| !t.is_empty()))
        .collect()
}

/// Splits a `| a | b |` row into its trimmed cells.
///
/// `\|` stands for a literal pipe and `\\` for a backslash. Text after the
/// last pipe is a cell only if it isn't blank.
fn split_row(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = line.chars().skip(1);

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('|') => cell.push('|'),
                Some('\\') => cell.push('\\'),
                Some(other) => {
                    cell.push('\\');
                    cell.push(other);
                }
                None => cell.push('\\'),
            },
            '|' => cells.push(std::mem::take(&mut cell).trim().to_owned()),
            c => cell.push(c),
        }
    }
    if !cell.trim().is_empty() {
        cells.push(cell.trim().to_owned());
    }
    cells
}
