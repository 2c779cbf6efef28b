//! Language detection and return-type heuristics.
//!
//! The heuristics here are deliberately shallow: they look at the first line
//! of a definition for a return clause and fall back to scanning the body for
//! a `return <value>` statement. They never fail.

use std::fmt;

use camino::Utf8Path;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::is_identifier_char;

/// Languages recognised for return-type analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceLanguage {
    /// Go source files (`.go`).
    Go,
    /// Rust source files (`.rs`).
    Rust,
    /// Python source files (`.py`, `.pyi`).
    Python,
    /// TypeScript source files.
    TypeScript,
    /// JavaScript source files.
    JavaScript,
    /// Java source files.
    Java,
    /// Kotlin source files.
    Kotlin,
    /// C# source files.
    CSharp,
    /// C source and header files.
    C,
    /// C++ source and header files.
    Cpp,
    /// Anything else.
    #[default]
    Unknown,
}

impl SourceLanguage {
    /// Detects the language from a file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "go" => Self::Go,
            "rs" => Self::Rust,
            "py" | "pyi" => Self::Python,
            "ts" | "tsx" | "mts" | "cts" => Self::TypeScript,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "java" => Self::Java,
            "kt" | "kts" => Self::Kotlin,
            "cs" => Self::CSharp,
            "c" | "h" => Self::C,
            "cc" | "cpp" | "cxx" | "hpp" | "hh" | "hxx" => Self::Cpp,
            _ => Self::Unknown,
        }
    }

    /// Detects the language from a path's extension.
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Self {
        path.extension().map_or(Self::Unknown, Self::from_extension)
    }

    /// Returns the lower-case identifier for this language.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Python => "python",
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Java => "java",
            Self::Kotlin => "kotlin",
            Self::CSharp => "csharp",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best-effort return signature of a callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnSignature {
    /// Return type text, `"unknown"` when no clause was recognised.
    pub return_type: String,
    /// Whether the callable appears to produce a usable value.
    pub has_return_value: bool,
}

const UNKNOWN_TYPE: &str = "unknown";

static RETURN_WITH_VALUE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\breturn\s+[^\s;})]").ok());

const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "internal",
    "static",
    "final",
    "abstract",
    "virtual",
    "override",
    "async",
    "inline",
    "extern",
    "const",
    "constexpr",
    "synchronized",
    "native",
    "sealed",
    "unsafe",
    "new",
];

/// Analyses the definition text of a callable named `name`.
#[must_use]
pub fn return_signature(language: SourceLanguage, name: &str, code: &str) -> ReturnSignature {
    let first_line = code.lines().next().unwrap_or_default();
    let clause = match language {
        SourceLanguage::Go => go_clause(first_line, name),
        SourceLanguage::Rust => rust_clause(first_line, name),
        SourceLanguage::Python => python_clause(first_line, name),
        SourceLanguage::TypeScript | SourceLanguage::JavaScript => {
            colon_clause(first_line, name, None)
        }
        SourceLanguage::Kotlin => colon_clause(first_line, name, Some("Unit")),
        SourceLanguage::Java | SourceLanguage::CSharp | SourceLanguage::C | SourceLanguage::Cpp => {
            prefix_clause(first_line, name)
        }
        SourceLanguage::Unknown => None,
    };

    clause.map_or_else(
        || ReturnSignature {
            return_type: UNKNOWN_TYPE.to_owned(),
            has_return_value: body_returns_value(code),
        },
        |return_type| ReturnSignature {
            has_return_value: !is_no_value(&return_type),
            return_type,
        },
    )
}

/// Whether a return clause denotes "no value" in its language.
fn is_no_value(return_type: &str) -> bool {
    matches!(
        return_type.trim(),
        "" | "void" | "None" | "Unit" | "()" | "!" | "never" | "Promise<void>"
    )
}

/// Whether any line after the signature returns a value.
fn body_returns_value(code: &str) -> bool {
    code.lines()
        .skip(1)
        .any(|line| {
            RETURN_WITH_VALUE
                .as_ref()
                .is_some_and(|pattern| pattern.is_match(line))
        })
}

/// Returns the text after the parameter list that follows `name`.
///
/// `None` when the name or a balanced parameter list is not on this line.
fn after_parameters<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let name_at = find_word(line, name)?;
    let after_name = line.get(name_at.saturating_add(name.len())..)?;
    let open = after_name.find('(')?;
    // Generic parameter lists sit between the name and `(`.
    let between = after_name.get(..open)?.trim();
    if !(between.is_empty() || between.starts_with('<') || between.starts_with('[')) {
        return None;
    }
    let params = after_name.get(open..)?;
    let close = matching_paren(params)?;
    params.get(close.saturating_add(1)..)
}

/// Finds `word` in `line` at identifier boundaries.
fn find_word(line: &str, word: &str) -> Option<usize> {
    if word.is_empty() {
        return None;
    }
    line.match_indices(word).map(|(index, _)| index).find(|&index| {
        let before_ok = line
            .get(..index)
            .and_then(|head| head.chars().next_back())
            .is_none_or(|ch| !is_identifier_char(ch));
        let after_ok = line
            .get(index.saturating_add(word.len())..)
            .and_then(|tail| tail.chars().next())
            .is_none_or(|ch| !is_identifier_char(ch));
        before_ok && after_ok
    })
}

/// Returns the byte offset of the `)` matching the `(` at offset zero.
pub(crate) fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 0_usize;
    for (index, ch) in text.char_indices() {
        match ch {
            '(' => depth = depth.saturating_add(1),
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

fn until_any<'a>(text: &'a str, stops: &[&str]) -> &'a str {
    let end = stops
        .iter()
        .filter_map(|stop| text.find(stop))
        .min()
        .unwrap_or(text.len());
    text.get(..end).unwrap_or(text)
}

fn go_clause(line: &str, name: &str) -> Option<String> {
    let tail = after_parameters(line, name)?;
    if !tail.contains('{') {
        return None;
    }
    let clause = until_any(tail, &["{"]).trim();
    Some(if clause.is_empty() {
        "void".to_owned()
    } else {
        clause.to_owned()
    })
}

fn rust_clause(line: &str, name: &str) -> Option<String> {
    let tail = after_parameters(line, name)?;
    if let Some(arrow) = tail.find("->") {
        let after_arrow = tail.get(arrow.saturating_add(2)..)?;
        let clause = until_any(after_arrow, &["{", " where", ";"]).trim();
        return (!clause.is_empty()).then(|| clause.to_owned());
    }
    (tail.contains('{') || tail.contains(';')).then(|| "()".to_owned())
}

fn python_clause(line: &str, name: &str) -> Option<String> {
    let tail = after_parameters(line, name)?.trim();
    let annotated = tail.strip_prefix("->")?;
    let clause = annotated.trim().trim_end_matches(':').trim();
    (!clause.is_empty()).then(|| clause.to_owned())
}

fn colon_clause(line: &str, name: &str, implicit: Option<&str>) -> Option<String> {
    let tail = after_parameters(line, name)?.trim();
    if let Some(annotated) = tail.strip_prefix(':') {
        let clause = until_any(annotated, &["{", "=>", " ="]).trim();
        return (!clause.is_empty()).then(|| clause.to_owned());
    }
    if tail.starts_with('{') {
        return implicit.map(str::to_owned);
    }
    None
}

fn prefix_clause(line: &str, name: &str) -> Option<String> {
    let name_at = find_word(line, name)?;
    after_parameters(line, name)?;
    let head = line.get(..name_at)?.trim();
    let candidate = head
        .split_whitespace()
        .filter(|token| !MODIFIERS.contains(token) && !token.starts_with('@'))
        .next_back()?;
    let cleaned = candidate.trim_end_matches("::").trim();
    if cleaned.is_empty() || cleaned.ends_with(':') {
        return None;
    }
    Some(cleaned.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sig(language: SourceLanguage, name: &str, code: &str) -> (String, bool) {
        let signature = return_signature(language, name, code);
        (signature.return_type, signature.has_return_value)
    }

    #[rstest]
    #[case("main.go", SourceLanguage::Go)]
    #[case("lib.RS", SourceLanguage::Rust)]
    #[case("app.tsx", SourceLanguage::TypeScript)]
    #[case("index.mjs", SourceLanguage::JavaScript)]
    #[case("Main.kt", SourceLanguage::Kotlin)]
    #[case("include/x.hpp", SourceLanguage::Cpp)]
    #[case("README", SourceLanguage::Unknown)]
    fn detects_language_from_path(#[case] path: &str, #[case] expected: SourceLanguage) {
        assert_eq!(SourceLanguage::from_path(Utf8Path::new(path)), expected);
    }

    #[rstest]
    #[case("func B() int {\n\treturn 1\n}", "B", "int", true)]
    #[case("func A() {\n\tB()\n}", "A", "void", false)]
    #[case("func (s *Server) Start(ctx context.Context) (int, error) {", "Start", "(int, error)", true)]
    #[case("func Map[T any](xs []T) []T {", "Map", "[]T", true)]
    fn go_return_clauses(
        #[case] code: &str,
        #[case] name: &str,
        #[case] expected_type: &str,
        #[case] expected_value: bool,
    ) {
        assert_eq!(
            sig(SourceLanguage::Go, name, code),
            (expected_type.to_owned(), expected_value)
        );
    }

    #[rstest]
    #[case("fn total(items: &[u32]) -> u32 {", "total", "u32", true)]
    #[case("pub fn run(&mut self) {", "run", "()", false)]
    #[case("fn parse<T: FromStr>(s: &str) -> Result<T, Error> where T: Debug {", "parse", "Result<T, Error>", true)]
    #[case("fn never() -> ! {", "never", "!", false)]
    fn rust_return_clauses(
        #[case] code: &str,
        #[case] name: &str,
        #[case] expected_type: &str,
        #[case] expected_value: bool,
    ) {
        assert_eq!(
            sig(SourceLanguage::Rust, name, code),
            (expected_type.to_owned(), expected_value)
        );
    }

    #[test]
    fn python_annotations_and_fallback() {
        assert_eq!(
            sig(SourceLanguage::Python, "load", "def load(path) -> dict:\n    return {}"),
            ("dict".to_owned(), true)
        );
        assert_eq!(
            sig(SourceLanguage::Python, "log", "def log(msg) -> None:\n    print(msg)"),
            ("None".to_owned(), false)
        );
        assert_eq!(
            sig(SourceLanguage::Python, "calc", "def calc(a, b):\n    return a + b"),
            ("unknown".to_owned(), true)
        );
        assert_eq!(
            sig(SourceLanguage::Python, "noop", "def noop():\n    return"),
            ("unknown".to_owned(), false)
        );
    }

    #[test]
    fn typescript_and_kotlin_colon_clauses() {
        assert_eq!(
            sig(SourceLanguage::TypeScript, "fetch", "async fetch(id: string): Promise<User> {"),
            ("Promise<User>".to_owned(), true)
        );
        assert_eq!(
            sig(SourceLanguage::TypeScript, "reset", "reset(): void {"),
            ("void".to_owned(), false)
        );
        assert_eq!(
            sig(SourceLanguage::Kotlin, "greet", "fun greet(name: String) {"),
            ("Unit".to_owned(), false)
        );
    }

    #[test]
    fn prefix_typed_languages() {
        assert_eq!(
            sig(SourceLanguage::Java, "count", "public static int count(List<String> xs) {"),
            ("int".to_owned(), true)
        );
        assert_eq!(
            sig(SourceLanguage::CSharp, "Run", "public override void Run() {"),
            ("void".to_owned(), false)
        );
    }

    #[test]
    fn unknown_language_scans_body() {
        assert_eq!(
            sig(SourceLanguage::Unknown, "f", "f() {\n  return value;\n}"),
            ("unknown".to_owned(), true)
        );
    }

    #[test]
    fn multi_line_parameters_fall_back_to_body_scan() {
        let code = "func Long(\n\ta int,\n) int {\n\treturn a\n}";
        assert_eq!(sig(SourceLanguage::Go, "Long", code), ("unknown".to_owned(), true));
    }
}
