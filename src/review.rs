use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a reported issue, determines marker color and weight.
///
/// Anything the service returns outside the known set degrades to `Unknown`
/// instead of failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,   // Red
    Warning, // Orange
    Info,    // Yellow
    #[default]
    #[serde(other)]
    Unknown,
}

impl Severity {
    /// Numeric marker weight: error > warning > info > unknown.
    pub fn weight(self) -> u8 {
        match self {
            Severity::Error => 3,
            Severity::Warning => 2,
            Severity::Info => 1,
            Severity::Unknown => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Unknown => "unknown",
        }
    }
}

/// One finding reported by the review service.
///
/// `line` is 1-based. The service is trusted to keep it within the submitted
/// code, but out-of-range values are clamped at render time, never rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub line: i64,
    #[serde(default)]
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// The review as returned by the service. Issue order is arrival order; the
/// client never sorts, corrects, or re-scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReviewResult {
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
}

/// Top-level response wrapper from `POST /api/review/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEnvelope {
    pub review: ReviewResult,
    pub response_time: f64,
}

/// Languages the review form offers. Picks editor syntax highlighting and is
/// forwarded to the backend verbatim; never validated against the code itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
    Javascript,
    Typescript,
    Java,
    Cpp,
    C,
    Go,
    Rust,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Language::Python,
        Language::Javascript,
        Language::Typescript,
        Language::Java,
        Language::Cpp,
        Language::C,
        Language::Go,
        Language::Rust,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::Javascript => "JavaScript",
            Language::Typescript => "TypeScript",
            Language::Java => "Java",
            Language::Cpp => "C++",
            Language::C => "C",
            Language::Go => "Go",
            Language::Rust => "Rust",
        }
    }

    /// Wire name, matching the serde representation.
    pub fn wire_name(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::Typescript => "typescript",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::Go => "go",
            Language::Rust => "rust",
        }
    }

    /// File-extension token understood by the syntax highlighter.
    pub fn syntax_token(self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::Javascript => "js",
            Language::Typescript => "ts",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::Go => "go",
            Language::Rust => "rs",
        }
    }

    /// Parses a wire name, falling back to Python for anything unknown.
    pub fn from_wire(name: &str) -> Language {
        Language::ALL
            .into_iter()
            .find(|l| l.wire_name() == name)
            .unwrap_or(Language::Python)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
