//! Call-site detection and return-value-usage classification.
//!
//! Call sites are found textually: every identifier followed by an opening
//! parenthesis in a function body, outside string literals and comments, is a
//! candidate. Each candidate is resolved
//! through the [`SymbolResolver`]; only in-scope callables become edges.

use camino::Utf8Path;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::GraphError;
use crate::factory::NodeFactory;
use crate::node::{NodeId, Position, SourceRange};
use crate::resolver::{DocumentCache, ResolvedSymbol, SymbolResolver};
use crate::scope::ScopeFilter;
use crate::signature::{SourceLanguage, matching_paren};
use crate::text::{body_lines, code_lines, column, is_identifier_char};

static CALL_SITE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\(").ok());

/// Identifiers that look like calls but are control flow or operators.
const NON_CALL_WORDS: &[&str] = &[
    "if", "elif", "else", "for", "while", "switch", "match", "case", "return", "yield", "catch",
    "and", "or", "not", "in", "is", "func", "fn", "def", "function", "sizeof", "typeof",
    "await", "defer", "go", "new",
];

/// Keywords introducing a definition; the identifier after them is not a call.
const DEFINITION_WORDS: &[&str] = &["fn", "func", "def", "function", "class", "struct"];

/// Keywords after which a call's result feeds a condition or a value.
const CONSUMING_WORDS: &[&str] = &[
    "return", "yield", "if", "elif", "while", "for", "switch", "match", "in", "not", "and", "or",
];

/// Operators and punctuation after which a call's result is consumed.
const CONSUMING_OPERATORS: &[&str] = &[
    "==", "!=", "<=", ">=", "<", ">", "&&", "||", "!", "(", "[", ",",
];

/// Keywords that dispatch a call without waiting for its result.
const DISPATCH_WORDS: &[&str] = &["defer", "go"];

/// Method names treated as standalone logging statements.
const LOGGING_METHODS: &[&str] = &[
    "log", "trace", "debug", "info", "warn", "warning", "error", "fatal", "print", "println",
    "printf", "logf", "debugf", "infof", "warnf", "errorf", "fatalf",
];

/// A call found in a function body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// Identifier immediately before the opening parenthesis.
    pub name: String,
    /// Zero-based position of the identifier.
    pub position: Position,
    /// Whether the caller consumes the call's result at this site.
    pub consumes_result: bool,
}

/// Finds call-site candidates in the body of the symbol spanning `range`.
///
/// The first line of the span is treated as the signature and skipped.
/// String literals and comments are ignored, using the syntax of
/// `language`. Results are in source order.
#[must_use]
pub fn scan_call_sites(source: &str, range: &SourceRange, language: SourceLanguage) -> Vec<CallSite> {
    let Some(pattern) = CALL_SITE.as_ref() else {
        return Vec::new();
    };

    let mut sites = Vec::new();
    for line in code_lines(&body_lines(source, range), language) {
        let code = line.code.as_str();
        for captures in pattern.captures_iter(code) {
            let Some(name) = captures.get(1) else {
                continue;
            };
            let before = code.get(..name.start()).unwrap_or_default();
            if NON_CALL_WORDS.contains(&name.as_str()) || follows_definition_word(before) {
                continue;
            }
            sites.push(CallSite {
                name: name.as_str().to_owned(),
                position: Position::new(line.number, column(line.offset.saturating_add(name.start()))),
                consumes_result: detect_return_value_usage(code, name.start(), name.as_str()),
            });
        }
    }
    sites
}

fn follows_definition_word(before: &str) -> bool {
    let trimmed = before.trim_end();
    DEFINITION_WORDS
        .iter()
        .any(|word| ends_with_word(trimmed, word))
}

/// Decides whether the call to `call_name` starting at byte `call_column`
/// of `line` consumes the call's result.
///
/// Rules are checked in order and the first match wins:
///
/// 1. an assignment operator precedes the call (consumed);
/// 2. the call follows `return`, a comparison or logical operator, an
///    argument or index opener, or a condition keyword (consumed);
/// 3. the call follows `defer` or `go` (not consumed);
/// 4. only a receiver chain precedes the call and nothing follows it, or
///    the call is a logging method on a bare chain (not consumed);
/// 5. the call directly follows an opening brace (not consumed);
/// 6. otherwise the call is consumed when anything precedes it.
///
/// The result depends only on the arguments.
///
/// # Examples
///
/// ```
/// use tapestry_graph::detect_return_value_usage;
///
/// assert!(detect_return_value_usage("\tx := B()", 6, "B"));
/// assert!(!detect_return_value_usage("\tB()", 1, "B"));
/// assert!(!detect_return_value_usage("\tdefer f.Close()", 9, "Close"));
/// ```
#[must_use]
pub fn detect_return_value_usage(line: &str, call_column: usize, call_name: &str) -> bool {
    let prefix = line.get(..call_column).unwrap_or(line);
    if has_assignment(prefix) {
        return true;
    }

    let lead = strip_receiver_chain(prefix);
    if CONSUMING_OPERATORS.iter().any(|op| lead.ends_with(op))
        || CONSUMING_WORDS.iter().any(|word| ends_with_word(lead, word))
    {
        return true;
    }
    if DISPATCH_WORDS.iter().any(|word| ends_with_word(lead, word)) {
        return false;
    }

    let statement_start = strip_word_suffix(lead, "await").trim_end();
    if statement_start.is_empty() {
        if is_logging_method(call_name) {
            return false;
        }
        let after = line.get(call_column..).unwrap_or_default();
        if nothing_follows_call(after) {
            return false;
        }
    }

    if lead.ends_with('{') {
        return false;
    }
    !prefix.trim().is_empty()
}

fn is_logging_method(name: &str) -> bool {
    LOGGING_METHODS
        .iter()
        .any(|method| method.eq_ignore_ascii_case(name))
}

/// Returns whether `text` contains an assignment outside string literals.
fn has_assignment(text: &str) -> bool {
    let mut quote: Option<char> = None;
    let mut previous = '\0';
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        let next = chars.peek().copied().unwrap_or('\0');
        match quote {
            Some(open) => {
                if ch == open && previous != '\\' {
                    quote = None;
                }
            }
            None => match ch {
                '"' | '`' => quote = Some(ch),
                '=' if next != '=' && next != '>' && !matches!(previous, '=' | '!' | '<' | '>') => {
                    return true;
                }
                _ => {}
            },
        }
        previous = ch;
    }
    false
}

/// Removes a trailing receiver chain such as `self.`, `a.b().` or `Type::`.
fn strip_receiver_chain(prefix: &str) -> &str {
    let mut rest = prefix.trim_end();
    loop {
        let Some(receiver) = ["?.", ".", "::", "->"]
            .iter()
            .find_map(|separator| rest.strip_suffix(separator))
        else {
            return rest;
        };
        rest = strip_trailing_group(receiver.trim_end())
            .trim_end_matches(is_identifier_char)
            .trim_end();
    }
}

/// Strips one trailing bracketed group, so `a.b(x)` becomes `a.b`.
fn strip_trailing_group(text: &str) -> &str {
    let (open, close) = match text.chars().next_back() {
        Some(')') => ('(', ')'),
        Some(']') => ('[', ']'),
        _ => return text,
    };
    let mut depth = 0_usize;
    for (index, ch) in text.char_indices().rev() {
        if ch == close {
            depth = depth.saturating_add(1);
        } else if ch == open {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return text.get(..index).unwrap_or(text);
            }
        }
    }
    text
}

/// Returns whether the statement ends with the call, ignoring `;`, `?` and
/// `.await`. Calls whose arguments continue on later lines also count.
fn nothing_follows_call(from_call: &str) -> bool {
    let Some(open) = from_call.find('(') else {
        return true;
    };
    let arguments = from_call.get(open..).unwrap_or_default();
    let Some(close) = matching_paren(arguments) else {
        return true;
    };
    let mut tail = arguments.get(close.saturating_add(1)..).unwrap_or_default().trim();
    loop {
        let Some(shorter) = tail
            .strip_suffix(';')
            .or_else(|| tail.strip_suffix('?'))
            .or_else(|| tail.strip_suffix(".await"))
        else {
            return tail.is_empty();
        };
        tail = shorter.trim_end();
    }
}

fn ends_with_word(text: &str, word: &str) -> bool {
    text.strip_suffix(word).is_some_and(|head| {
        head.chars()
            .next_back()
            .is_none_or(|ch| !is_identifier_char(ch))
    })
}

fn strip_word_suffix<'a>(text: &'a str, word: &str) -> &'a str {
    if ends_with_word(text, word) {
        text.strip_suffix(word).unwrap_or(text)
    } else {
        text
    }
}

/// A call site that resolved to an in-scope callable.
#[derive(Debug, Clone)]
pub(crate) struct CallCandidate {
    pub(crate) target: ResolvedSymbol,
    pub(crate) target_id: NodeId,
    pub(crate) site: CallSite,
}

/// Resolves the call sites of a function into edge candidates.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EdgeDetector<'a> {
    pub(crate) factory: &'a NodeFactory,
    pub(crate) scope: &'a ScopeFilter,
}

impl EdgeDetector<'_> {
    /// Finds the in-scope calls made by `caller`, in source order.
    ///
    /// Resolution misses and out-of-scope definitions are logged and skipped.
    /// Only failure to read the caller's own source is an error.
    pub(crate) fn find_calls<R: SymbolResolver>(
        &self,
        resolver: &mut R,
        cache: &mut DocumentCache,
        caller: &ResolvedSymbol,
    ) -> Result<Vec<CallCandidate>, GraphError> {
        let caller_id = self.factory.identity(caller);
        let sites = scan_call_sites(
            cache.source(resolver, &caller.path)?,
            &caller.symbol.range,
            SourceLanguage::from_path(&caller.path),
        );

        let mut candidates = Vec::new();
        for site in sites {
            let Some(target) = self.resolve_site(resolver, cache, &caller.path, &site) else {
                continue;
            };
            let target_id = self.factory.identity(&target);
            if target_id == caller_id {
                continue;
            }
            candidates.push(CallCandidate {
                target,
                target_id,
                site,
            });
        }
        Ok(candidates)
    }

    fn resolve_site<R: SymbolResolver>(
        &self,
        resolver: &mut R,
        cache: &mut DocumentCache,
        path: &Utf8Path,
        site: &CallSite,
    ) -> Option<ResolvedSymbol> {
        let location = match resolver.resolve_definition(path, site.position) {
            Ok(Some(location)) => location,
            Ok(None) => {
                debug!(call = %site.name, %path, line = site.position.line, "call site did not resolve");
                return None;
            }
            Err(error) => {
                debug!(call = %site.name, %path, %error, "definition lookup failed");
                return None;
            }
        };

        if self.scope.is_external(&location.path) {
            debug!(call = %site.name, target = %location.path, "skipping external definition");
            return None;
        }

        match cache.symbol_at(resolver, &location, |kind| kind.is_callable()) {
            Ok(found) => {
                if found.is_none() {
                    debug!(call = %site.name, target = %location.path, "definition is not a callable");
                }
                found
            }
            Err(error) => {
                debug!(call = %site.name, target = %location.path, %error, "outline lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::declare_assign("\tx := B()", "B", true)]
    #[case::let_binding("    let total = compute(a);", "compute", true)]
    #[case::compound("\tn += count()", "count", true)]
    #[case::returned("\treturn build()", "build", true)]
    #[case::argument("\tfmt.Println(format(x))", "format", true)]
    #[case::second_argument("\tsend(a, encode(b))", "encode", true)]
    #[case::condition("\tif ready() {", "ready", true)]
    #[case::negated("\tif !ready() {", "ready", true)]
    #[case::comparison("\tok := a == check()", "check", true)]
    #[case::equality_only("\tif a == check() {", "check", true)]
    #[case::deferred("\tdefer f.Close()", "Close", false)]
    #[case::goroutine("\tgo worker(jobs)", "worker", false)]
    #[case::bare("\tB()", "B", false)]
    #[case::bare_method("\ts.store.Flush();", "Flush", false)]
    #[case::self_method("        self.reset()", "reset", false)]
    #[case::chained_receiver("\tbuilder.with(a).finish();", "finish", false)]
    #[case::try_operator("    self.save()?;", "save", false)]
    #[case::awaited("  await client.connect();", "connect", false)]
    #[case::logging_multiline("\tlog.Printf(\"starting %s\",", "Printf", false)]
    #[case::block_opener("\tfor { step() }", "step", false)]
    #[case::trailing_use("\thandle().Error()", "handle", false)]
    #[case::arithmetic("\tx + size()", "size", true)]
    fn classifies_return_value_usage(#[case] line: &str, #[case] name: &str, #[case] expected: bool) {
        let column = line.rfind(&format!("{name}(")).unwrap_or_default();
        assert_eq!(detect_return_value_usage(line, column, name), expected, "{line}");
    }

    #[test]
    fn classification_is_deterministic() {
        let line = "\tresult := compute(a, b)";
        let first = detect_return_value_usage(line, 11, "compute");
        for _ in 0..5 {
            assert_eq!(detect_return_value_usage(line, 11, "compute"), first);
        }
    }

    #[test]
    fn comparison_is_not_an_assignment() {
        assert!(!has_assignment("if a == b"));
        assert!(!has_assignment("x != y"));
        assert!(!has_assignment("x <= y"));
        assert!(!has_assignment("Some(v) =>"));
        assert!(has_assignment("x := "));
        assert!(!has_assignment("print(\"a = b\", "));
    }

    #[test]
    fn scan_finds_calls_in_source_order() {
        let source = "func A() {\n\tx := B()\n\tC(x) // D()\n\tif E() {\n\t}\n}";
        let range = SourceRange::new(Position::new(0, 0), Position::new(5, 1));
        let sites = scan_call_sites(source, &range, SourceLanguage::Go);
        let names: Vec<_> = sites.iter().map(|site| site.name.as_str()).collect();
        assert_eq!(names, ["B", "C", "E"]);
        let first = sites.first().expect("first site");
        assert_eq!(first.position, Position::new(1, 6));
        assert!(first.consumes_result);
        assert!(!sites.get(1).expect("second site").consumes_result);
    }

    #[test]
    fn scan_skips_nested_definitions_and_keywords() {
        let source = "def outer():\n    def inner(x):\n        return x\n    while (ok()):\n        inner(1)\n";
        let range = SourceRange::new(Position::new(0, 0), Position::new(4, 16));
        let names: Vec<_> = scan_call_sites(source, &range, SourceLanguage::Python)
            .into_iter()
            .map(|site| site.name)
            .collect();
        assert_eq!(names, ["ok", "inner"]);
    }

    #[rstest]
    #[case::go_string_and_block_comment(
        SourceLanguage::Go,
        "func A() { fmt.Println(\"never call B() here\"); /* C() */ }",
        &["Println"]
    )]
    #[case::doc_comment_lines(
        SourceLanguage::TypeScript,
        "function a() {\n  /**\n   * Calls c() first.\n   */\n  d();\n}",
        &["d"]
    )]
    #[case::python_hash_and_docstring(
        SourceLanguage::Python,
        "def a():\n    \"\"\"Runs b().\"\"\"\n    c()  # d()\n",
        &["c"]
    )]
    #[case::rust_raw_string(
        SourceLanguage::Rust,
        "fn a() {\n    let q = r#\"select(1)\"#; b(q);\n}",
        &["b"]
    )]
    #[case::typescript_private_member(
        SourceLanguage::TypeScript,
        "function a() {\n  this.#reset(); b();\n}",
        &["reset", "b"]
    )]
    fn scan_ignores_literals_and_comments(
        #[case] language: SourceLanguage,
        #[case] source: &str,
        #[case] expected: &[&str],
    ) {
        let last = u32::try_from(source.lines().count()).unwrap_or(1).saturating_sub(1);
        let range = SourceRange::new(Position::new(0, 0), Position::new(last, 80));
        let names: Vec<_> = scan_call_sites(source, &range, language)
            .into_iter()
            .map(|site| site.name)
            .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn single_line_body_reports_absolute_columns() {
        let source = "func A() { B() }";
        let range = SourceRange::new(Position::new(0, 0), Position::new(0, 16));
        let sites = scan_call_sites(source, &range, SourceLanguage::Go);
        assert_eq!(sites.len(), 1);
        let site = sites.first().expect("site");
        assert_eq!(site.position, Position::new(0, 11));
        assert!(!site.consumes_result);
    }
}
