//! Tree-sitter parsing wrapper with error recovery.
//!
//! Outlines are extracted from whatever tree Tree-sitter produces, so a file
//! with syntax errors still yields the symbols that parsed cleanly. The
//! errors are kept for diagnostics.

use std::ops::Range;

use crate::error::SyntaxError;
use crate::language::SupportedLanguage;
use crate::position::point_to_one_based;

/// Node kinds embedding code inside a string literal.
const INTERPOLATION_KINDS: &[&str] = &["template_substitution", "interpolation"];

/// Result of parsing source code.
///
/// Contains the parsed syntax tree along with the source it was parsed from.
#[derive(Debug)]
pub struct ParseResult {
    tree: tree_sitter::Tree,
    source: String,
    language: SupportedLanguage,
}

impl ParseResult {
    /// Returns the parsed syntax tree.
    #[must_use]
    pub const fn tree(&self) -> &tree_sitter::Tree {
        &self.tree
    }

    /// Returns the source code that was parsed.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the language of the parsed code.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Returns the root node of the syntax tree.
    #[must_use]
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Returns the source text covered by `node`, or `""` if the node does
    /// not belong to this tree.
    #[must_use]
    pub fn text(&self, node: tree_sitter::Node<'_>) -> &str {
        self.source.get(node.byte_range()).unwrap_or_default()
    }

    /// Returns whether the tree contains ERROR or MISSING nodes.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Returns whether `point` falls inside a string literal or a comment.
    ///
    /// Interpolated expressions inside template and format strings count as
    /// code.
    #[must_use]
    pub fn is_literal_or_comment(&self, point: tree_sitter::Point) -> bool {
        let mut current = self.tree.root_node().descendant_for_point_range(point, point);
        while let Some(node) = current {
            let kind = node.kind();
            if INTERPOLATION_KINDS.contains(&kind) {
                return false;
            }
            if kind.contains("comment") || kind.contains("string") || kind == "char_literal" {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Collects all syntax errors found in the parse result.
    #[must_use]
    pub fn errors(&self) -> Vec<SyntaxErrorInfo> {
        let mut errors = Vec::new();
        collect_error_nodes(self.tree.root_node(), &self.source, &mut errors);
        errors
    }
}

/// Information about a syntax error found during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrorInfo {
    /// Byte range of the error in the source.
    pub byte_range: Range<usize>,
    /// Line number (one-based) where the error starts.
    pub line: u32,
    /// Column number (one-based) where the error starts.
    pub column: u32,
    /// Human-readable description of the error.
    pub message: String,
}

impl SyntaxErrorInfo {
    fn from_node(node: tree_sitter::Node<'_>, source: &str) -> Self {
        let (line, column) = point_to_one_based(node.start_position());
        let message = if node.is_missing() {
            format!("missing {}", node.kind())
        } else {
            let snippet: String = source
                .get(node.byte_range())
                .unwrap_or_default()
                .chars()
                .take(20)
                .collect();
            format!("unexpected `{snippet}`")
        };

        Self {
            byte_range: node.byte_range(),
            line,
            column,
            message,
        }
    }
}

/// Tree-sitter parser wrapper for a specific language.
pub struct Parser {
    inner: tree_sitter::Parser,
    language: SupportedLanguage,
}

impl Parser {
    /// Creates a new parser for the given language.
    ///
    /// # Errors
    ///
    /// Returns an error if the Tree-sitter parser cannot be initialised
    /// with the language grammar.
    pub fn new(language: SupportedLanguage) -> Result<Self, SyntaxError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&language.tree_sitter_language())
            .map_err(|e| SyntaxError::parser_init(language, e.to_string()))?;

        Ok(Self { inner, language })
    }

    /// Returns the language this parser is configured for.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Parses source code and returns the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the parser fails to produce a syntax tree. This
    /// is rare and typically indicates a parser configuration issue.
    pub fn parse(&mut self, source: impl Into<String>) -> Result<ParseResult, SyntaxError> {
        let text = source.into();
        let tree = self
            .inner
            .parse(&text, None)
            .ok_or_else(|| SyntaxError::parse(self.language, "parsing failed"))?;

        Ok(ParseResult {
            tree,
            source: text,
            language: self.language,
        })
    }
}

fn collect_error_nodes(
    node: tree_sitter::Node<'_>,
    source: &str,
    errors: &mut Vec<SyntaxErrorInfo>,
) {
    if node.is_error() || node.is_missing() {
        errors.push(SyntaxErrorInfo::from_node(node, source));
        return;
    }
    if !node.has_error() {
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, source, errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SupportedLanguage::Rust, "fn main() {}")]
    #[case(SupportedLanguage::Python, "def hello():\n    pass")]
    #[case(
        SupportedLanguage::TypeScript,
        "function hello(): string { return 'hi'; }"
    )]
    #[case(SupportedLanguage::Go, "package main\n\nfunc main() {}\n")]
    fn parser_parses_valid_source(#[case] language: SupportedLanguage, #[case] source: &str) {
        let mut parser = Parser::new(language).expect("parser init");
        let result = parser.parse(source).expect("parse");

        assert!(!result.has_errors());
        assert!(result.errors().is_empty());
        assert_eq!(result.language(), language);
    }

    #[rstest]
    #[case(SupportedLanguage::Rust, "fn broken() {")]
    #[case(SupportedLanguage::Python, "def broken(")]
    #[case(SupportedLanguage::Go, "package main\n\nfunc broken( {\n")]
    fn parser_detects_syntax_errors(#[case] language: SupportedLanguage, #[case] source: &str) {
        let mut parser = Parser::new(language).expect("parser init");
        let result = parser.parse(source).expect("parse");

        assert!(result.has_errors());
        let first = result.errors().into_iter().next().expect("has error");
        assert!(first.line >= 1);
        assert!(first.column >= 1);
    }

    #[rstest]
    #[case::go_string(SupportedLanguage::Go, "package main\n\nfunc A() { f(\"call B() here\") }\n", 2, 25, true)]
    #[case::go_block_comment(SupportedLanguage::Go, "package main\n\nfunc A() { /* C() */ }\n", 2, 14, true)]
    #[case::go_call(SupportedLanguage::Go, "package main\n\nfunc A() { f(\"x\") }\n", 2, 11, false)]
    #[case::rust_doc_comment(SupportedLanguage::Rust, "fn a() {\n    // b()\n}\n", 1, 7, true)]
    #[case::rust_raw_string(SupportedLanguage::Rust, "fn a() { r#\"b()\"#; }\n", 0, 12, true)]
    #[case::python_docstring(SupportedLanguage::Python, "def a():\n    \"\"\"b()\"\"\"\n", 1, 7, true)]
    #[case::python_interpolation(SupportedLanguage::Python, "x = f\"{b()}\"\n", 0, 7, false)]
    #[case::typescript_template(SupportedLanguage::TypeScript, "const s = `${b()} c()`;\n", 0, 18, true)]
    #[case::typescript_substitution(SupportedLanguage::TypeScript, "const s = `${b()} c()`;\n", 0, 13, false)]
    fn literal_and_comment_positions_are_detected(
        #[case] language: SupportedLanguage,
        #[case] source: &str,
        #[case] row: usize,
        #[case] column: usize,
        #[case] expected: bool,
    ) {
        let mut parser = Parser::new(language).expect("parser init");
        let result = parser.parse(source).expect("parse");
        let point = tree_sitter::Point { row, column };
        assert_eq!(result.is_literal_or_comment(point), expected);
    }

    #[test]
    fn text_returns_node_source() {
        let mut parser = Parser::new(SupportedLanguage::Go).expect("parser init");
        let result = parser.parse("package demo\n").expect("parse");
        let clause = result.root_node().named_child(0).expect("package clause");
        assert_eq!(result.text(clause), "package demo");
    }
}
