use std::collections::BTreeMap;
use std::ops::Range;

use iced::advanced::text::highlighter::Format;
use iced::advanced::text::Highlighter;
use iced::{Color, Font, Theme};

use crate::review::{Issue, Severity};

/// A visual annotation anchored to one source line, derived from an [`Issue`].
///
/// The span always covers the whole target line. `line` is the 0-based index
/// after anchoring: issues pointing past the end of the code are pulled back
/// to the last line, and issues landing on an empty line are pulled up to the
/// nearest non-empty line so the tint stays visible.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub line: usize,
    pub start: usize,
    pub end: usize,
    pub weight: u8,
    pub message: String,
}

/// Byte offset of the start of every line. Always non-empty: the empty string
/// still has one line.
pub fn line_starts(code: &str) -> Vec<usize> {
    let mut starts = vec![0];

    for (i, ch) in code.char_indices() {
        if ch == '\n' {
            starts.push(i + 1);
        }
    }

    starts
}

/// Byte span of one line, newline excluded.
fn line_span(starts: &[usize], code: &str, line: usize) -> (usize, usize) {
    let start = starts[line];
    let end = if line + 1 < starts.len() {
        starts[line + 1] - 1
    } else {
        code.len()
    };
    (start, end)
}

/// Converts a 1-based issue line into a 0-based index within the code.
/// Out-of-range lines clamp into `[0, line_count)`; empty target lines have
/// no glyphs to tint, so the anchor walks up to the nearest non-empty line.
fn anchor_line(issue_line: i64, starts: &[usize], code: &str) -> usize {
    let last = starts.len().saturating_sub(1);
    let mut line = if issue_line <= 1 {
        0
    } else {
        ((issue_line - 1) as usize).min(last)
    };

    loop {
        let (start, end) = line_span(starts, code, line);
        if start < end || line == 0 {
            return line;
        }
        line -= 1;
    }
}

/// Groups issues by the 0-based line they anchor to. Multiple issues on the
/// same line are all kept, in arrival order.
pub fn issues_by_line<'a>(issues: &'a [Issue], code: &str) -> BTreeMap<usize, Vec<&'a Issue>> {
    let starts = line_starts(code);
    let mut by_line: BTreeMap<usize, Vec<&Issue>> = BTreeMap::new();

    for issue in issues {
        by_line
            .entry(anchor_line(issue.line, &starts, code))
            .or_default()
            .push(issue);
    }

    by_line
}

/// Derives one marker per issue, in arrival order. The display message is the
/// issue message prefixed with its uppercased severity label.
pub fn build_markers(issues: &[Issue], code: &str) -> Vec<Marker> {
    let starts = line_starts(code);

    issues
        .iter()
        .map(|issue| {
            let line = anchor_line(issue.line, &starts, code);
            let (start, end) = line_span(&starts, code, line);

            Marker {
                line,
                start,
                end,
                weight: issue.severity.weight(),
                message: format!(
                    "{}: {}",
                    issue.severity.label().to_uppercase(),
                    issue.message
                ),
            }
        })
        .collect()
}

/// Visual treatment of a highlighted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Error,   // Red
    Warning, // Orange
    Info,    // Yellow
    Default, // Muted - unrecognized severity
    Hovered, // Blue - issue card under the cursor
}

impl Highlight {
    fn from_weight(weight: u8) -> Self {
        if weight >= Severity::Error.weight() {
            Highlight::Error
        } else if weight >= Severity::Warning.weight() {
            Highlight::Warning
        } else if weight >= Severity::Info.weight() {
            Highlight::Info
        } else {
            Highlight::Default
        }
    }
}

/// Per-line highlight kinds fed to the editor widget. When several issues
/// anchor to one line, the strongest severity wins; the hovered issue's line
/// overrides everything.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    pub lines: BTreeMap<usize, Highlight>,
}

pub fn highlight_settings(issues: &[Issue], code: &str, hovered: Option<usize>) -> Settings {
    let mut lines: BTreeMap<usize, Highlight> = BTreeMap::new();

    for (line, group) in issues_by_line(issues, code) {
        let strongest = group
            .iter()
            .map(|issue| issue.severity.weight())
            .max()
            .unwrap_or(0);
        lines.insert(line, Highlight::from_weight(strongest));
    }

    if let Some(index) = hovered {
        if let Some(issue) = issues.get(index) {
            let starts = line_starts(code);
            lines.insert(anchor_line(issue.line, &starts, code), Highlight::Hovered);
        }
    }

    Settings { lines }
}

/// Tints whole lines that carry at least one issue.
#[derive(Debug, Clone)]
pub struct MarkerHighlighter {
    settings: Settings,
    current_line: usize,
}

impl Highlighter for MarkerHighlighter {
    type Settings = Settings;
    type Highlight = Highlight;

    type Iterator<'a>
        = std::vec::IntoIter<(Range<usize>, Self::Highlight)>
    where
        Self: 'a;

    fn new(settings: &Self::Settings) -> Self {
        Self {
            settings: settings.clone(),
            current_line: 0,
        }
    }

    fn update(&mut self, new_settings: &Self::Settings) {
        // Settings changed -> ensure the editor re-feeds lines from the start
        if *new_settings != self.settings {
            self.current_line = 0;
        }
        self.settings = new_settings.clone();
    }

    fn change_line(&mut self, line: usize) {
        self.current_line = line;
    }

    fn highlight_line(&mut self, line: &str) -> Self::Iterator<'_> {
        let index = self.current_line;
        self.current_line = self.current_line.saturating_add(1);

        match self.settings.lines.get(&index) {
            Some(kind) if !line.is_empty() => vec![(0..line.len(), *kind)].into_iter(),
            _ => Vec::new().into_iter(),
        }
    }

    fn current_line(&self) -> usize {
        self.current_line
    }
}

pub fn to_format(highlight: &Highlight, _theme: &Theme) -> Format<Font> {
    let color = match highlight {
        Highlight::Error => Color {
            r: 1.0,
            g: 0.35,
            b: 0.35,
            a: 1.0,
        },
        Highlight::Warning => Color {
            r: 1.0,
            g: 0.6,
            b: 0.2,
            a: 1.0,
        },
        Highlight::Info => Color {
            r: 1.0,
            g: 0.85,
            b: 0.3,
            a: 1.0,
        },
        Highlight::Default => Color {
            r: 0.66,
            g: 0.7,
            b: 0.83,
            a: 1.0,
        },
        Highlight::Hovered => Color {
            r: 0.25,
            g: 0.75,
            b: 1.0,
            a: 1.0,
        },
    };

    Format {
        color: Some(color),
        font: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(line: i64, severity: Severity, message: &str) -> Issue {
        Issue {
            line,
            severity,
            message: message.to_string(),
            suggestion: None,
        }
    }

    #[test]
    fn line_starts_counts_every_line() {
        assert_eq!(line_starts(""), vec![0]);
        assert_eq!(line_starts("a"), vec![0]);
        assert_eq!(line_starts("a\nbb\n"), vec![0, 2, 5]);
    }

    #[test]
    fn marker_targets_the_issue_line() {
        let code = "def f():\n    pass";
        let markers = build_markers(&[issue(2, Severity::Warning, "unreachable")], code);

        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].line, 1);
        assert_eq!(&code[markers[0].start..markers[0].end], "    pass");
    }

    #[test]
    fn marker_message_is_prefixed_with_severity() {
        let code = "def f():\n    pass";
        let markers = build_markers(&[issue(1, Severity::Info, "add docstring")], code);

        assert_eq!(markers[0].message, "INFO: add docstring");
        assert_eq!(markers[0].weight, 1);
        assert_eq!(&code[markers[0].start..markers[0].end], "def f():");
    }

    #[test]
    fn markers_preserve_arrival_order() {
        let code = "a\nb\nc";
        let issues = [
            issue(3, Severity::Info, "third"),
            issue(1, Severity::Error, "first"),
            issue(2, Severity::Warning, "second"),
        ];

        let markers = build_markers(&issues, code);
        assert_eq!(markers.len(), 3);
        assert_eq!(markers[0].line, 2);
        assert_eq!(markers[1].line, 0);
        assert_eq!(markers[2].line, 1);
    }

    #[test]
    fn out_of_range_lines_clamp_without_panicking() {
        let code = "one\ntwo";
        let markers = build_markers(
            &[
                issue(99, Severity::Error, "past the end"),
                issue(0, Severity::Error, "before the start"),
                issue(-5, Severity::Error, "negative"),
            ],
            code,
        );

        assert_eq!(markers[0].line, 1);
        assert_eq!(&code[markers[0].start..markers[0].end], "two");
        assert_eq!(markers[1].line, 0);
        assert_eq!(markers[2].line, 0);
    }

    #[test]
    fn clamped_marker_skips_trailing_empty_lines() {
        // Trailing newline: the "last line" is empty and would render no tint
        let code = "x = 1\n";
        let markers = build_markers(&[issue(99, Severity::Error, "past the end")], code);

        assert_eq!(markers[0].line, 0);
        assert_eq!(&code[markers[0].start..markers[0].end], "x = 1");

        let settings = highlight_settings(&[issue(99, Severity::Error, "past the end")], code, None);
        assert_eq!(settings.lines.get(&0), Some(&Highlight::Error));
        assert!(settings.lines.get(&1).is_none());
    }

    #[test]
    fn empty_target_line_anchors_to_nearest_text_above() {
        let code = "x = 1\n\n\ny = 2";
        let markers = build_markers(&[issue(3, Severity::Warning, "blank")], code);

        assert_eq!(markers[0].line, 0);
        assert_eq!(&code[markers[0].start..markers[0].end], "x = 1");
    }

    #[test]
    fn all_empty_code_anchors_to_the_first_line() {
        let code = "\n\n";
        let markers = build_markers(&[issue(3, Severity::Error, "nothing here")], code);

        assert_eq!(markers[0].line, 0);
        assert_eq!(markers[0].start, markers[0].end);
    }

    #[test]
    fn multiple_issues_on_one_line_are_all_kept() {
        let code = "x = 1";
        let issues = [
            issue(1, Severity::Warning, "first"),
            issue(1, Severity::Info, "second"),
        ];

        let by_line = issues_by_line(&issues, code);
        let on_first = by_line.get(&0).expect("line 0");
        assert_eq!(on_first.len(), 2);
        assert_eq!(on_first[0].message, "first");
        assert_eq!(on_first[1].message, "second");
    }

    #[test]
    fn marker_derivation_is_idempotent() {
        let code = "a\nb";
        let issues = [issue(1, Severity::Error, "x"), issue(2, Severity::Info, "y")];

        assert_eq!(build_markers(&issues, code), build_markers(&issues, code));
    }

    #[test]
    fn strongest_severity_wins_per_line() {
        let code = "x = 1";
        let issues = [
            issue(1, Severity::Info, "minor"),
            issue(1, Severity::Error, "major"),
        ];

        let settings = highlight_settings(&issues, code, None);
        assert_eq!(settings.lines.get(&0), Some(&Highlight::Error));
    }

    #[test]
    fn settings_lines_match_marker_anchors() {
        let code = "a\nb\n\nc\n";
        let issues = [
            issue(1, Severity::Error, "first"),
            issue(3, Severity::Info, "on a blank line"),
            issue(42, Severity::Warning, "past the end"),
        ];

        let markers = build_markers(&issues, code);
        let settings = highlight_settings(&issues, code, None);

        for marker in &markers {
            assert!(settings.lines.contains_key(&marker.line));
        }
        assert_eq!(
            settings.lines.keys().copied().collect::<Vec<_>>(),
            {
                let mut lines: Vec<_> = markers.iter().map(|m| m.line).collect();
                lines.sort_unstable();
                lines.dedup();
                lines
            }
        );
    }

    #[test]
    fn hovered_issue_overrides_line_highlight() {
        let code = "x = 1\ny = 2";
        let issues = [
            issue(1, Severity::Error, "major"),
            issue(2, Severity::Info, "minor"),
        ];

        let settings = highlight_settings(&issues, code, Some(1));
        assert_eq!(settings.lines.get(&0), Some(&Highlight::Error));
        assert_eq!(settings.lines.get(&1), Some(&Highlight::Hovered));
    }

    #[test]
    fn unknown_severity_gets_default_highlight() {
        let code = "x = 1";
        let issues = [issue(1, Severity::Unknown, "odd")];

        let settings = highlight_settings(&issues, code, None);
        assert_eq!(settings.lines.get(&0), Some(&Highlight::Default));
    }

    #[test]
    fn empty_issue_list_yields_no_markers() {
        assert!(build_markers(&[], "fn main() {}").is_empty());
        assert!(highlight_settings(&[], "fn main() {}", None).lines.is_empty());
    }
}
