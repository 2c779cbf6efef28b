//! Document outlines extracted from Tree-sitter syntax trees.
//!
//! The outline mirrors what a language server reports for
//! `textDocument/documentSymbol`: functions, methods and type declarations,
//! with nested functions and class members as children. Methods declared
//! outside their type are named after the receiver, `Type::method` for Rust
//! `impl` blocks and `(*T).Method` for Go.

use tapestry_graph::{DocumentSymbol, SymbolKind};
use tree_sitter::Node;

use crate::language::SupportedLanguage;
use crate::parser::ParseResult;
use crate::position::node_range;

/// Lexical surroundings of the node being classified.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Enclosing {
    TopLevel,
    Function,
    /// Inside a class, trait or other member-bearing declaration.
    Class,
    /// Inside a Rust `impl` block for the named type.
    Impl(String),
}

/// A declaration recognised in the tree.
struct Declared<'t> {
    name: String,
    kind: SymbolKind,
    name_node: Node<'t>,
}

/// Extracts the symbol outline of a parsed file.
#[must_use]
pub fn outline(parsed: &ParseResult) -> Vec<DocumentSymbol> {
    let mut symbols = Vec::new();
    collect(parsed, parsed.root_node(), &Enclosing::TopLevel, &mut symbols);
    symbols
}

fn collect(
    parsed: &ParseResult,
    node: Node<'_>,
    enclosing: &Enclosing,
    out: &mut Vec<DocumentSymbol>,
) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        let Some(declared) = classify(parsed, child, enclosing) else {
            let inner =
                impl_target(parsed, child).map_or_else(|| enclosing.clone(), Enclosing::Impl);
            collect(parsed, child, &inner, out);
            continue;
        };

        let inner = if declared.kind.is_callable() {
            Enclosing::Function
        } else {
            Enclosing::Class
        };
        let mut children = Vec::new();
        collect(parsed, child, &inner, &mut children);
        out.push(
            DocumentSymbol::new(declared.name, declared.kind, node_range(child))
                .with_selection_range(node_range(declared.name_node))
                .with_children(children),
        );
    }
}

fn classify<'t>(
    parsed: &ParseResult,
    node: Node<'t>,
    enclosing: &Enclosing,
) -> Option<Declared<'t>> {
    match parsed.language() {
        SupportedLanguage::Rust => classify_rust(parsed, node, enclosing),
        SupportedLanguage::Go => classify_go(parsed, node),
        SupportedLanguage::Python => classify_python(parsed, node, enclosing),
        SupportedLanguage::TypeScript => classify_typescript(parsed, node),
    }
}

fn named<'t>(parsed: &ParseResult, node: Node<'t>, kind: SymbolKind) -> Option<Declared<'t>> {
    let name_node = node.child_by_field_name("name")?;
    Some(Declared {
        name: parsed.text(name_node).to_owned(),
        kind,
        name_node,
    })
}

fn classify_rust<'t>(
    parsed: &ParseResult,
    node: Node<'t>,
    enclosing: &Enclosing,
) -> Option<Declared<'t>> {
    match node.kind() {
        "function_item" => match enclosing {
            Enclosing::Impl(target) => {
                let mut declared = named(parsed, node, SymbolKind::Method)?;
                declared.name = format!("{target}::{}", declared.name);
                Some(declared)
            }
            Enclosing::Class => named(parsed, node, SymbolKind::Method),
            Enclosing::TopLevel | Enclosing::Function => named(parsed, node, SymbolKind::Function),
        },
        "struct_item" | "union_item" => named(parsed, node, SymbolKind::Struct),
        "enum_item" => named(parsed, node, SymbolKind::Enum),
        "trait_item" => named(parsed, node, SymbolKind::Interface),
        "type_item" => named(parsed, node, SymbolKind::Type),
        _ => None,
    }
}

/// Returns the self type of a Rust `impl` block, without generics.
fn impl_target(parsed: &ParseResult, node: Node<'_>) -> Option<String> {
    if parsed.language() != SupportedLanguage::Rust || node.kind() != "impl_item" {
        return None;
    }
    let target = node.child_by_field_name("type")?;
    let base = if target.kind() == "generic_type" {
        target.child_by_field_name("type")?
    } else {
        target
    };
    Some(parsed.text(base).to_owned())
}

fn classify_go<'t>(parsed: &ParseResult, node: Node<'t>) -> Option<Declared<'t>> {
    match node.kind() {
        "function_declaration" => named(parsed, node, SymbolKind::Function),
        "method_declaration" => {
            let mut declared = named(parsed, node, SymbolKind::Method)?;
            if let Some(receiver) = go_receiver(parsed, node) {
                declared.name = format!("({receiver}).{}", declared.name);
            }
            Some(declared)
        }
        "type_spec" => {
            let kind = match node.child_by_field_name("type").map(|ty| ty.kind()) {
                Some("struct_type") => SymbolKind::Struct,
                Some("interface_type") => SymbolKind::Interface,
                _ => SymbolKind::Type,
            };
            named(parsed, node, kind)
        }
        _ => None,
    }
}

/// Formats a Go method receiver the way gopls does: `*T` or `T`.
fn go_receiver(parsed: &ParseResult, node: Node<'_>) -> Option<String> {
    let receiver = node.child_by_field_name("receiver")?;
    let mut cursor = receiver.walk();
    let parameter = receiver
        .named_children(&mut cursor)
        .find(|child| child.kind() == "parameter_declaration")?;
    let declared = parameter.child_by_field_name("type")?;
    let (pointer, pointee) = if declared.kind() == "pointer_type" {
        (true, declared.named_child(0)?)
    } else {
        (false, declared)
    };
    let base = if pointee.kind() == "generic_type" {
        pointee.child_by_field_name("type")?
    } else {
        pointee
    };
    let name = parsed.text(base);
    Some(if pointer {
        format!("*{name}")
    } else {
        name.to_owned()
    })
}

fn classify_python<'t>(
    parsed: &ParseResult,
    node: Node<'t>,
    enclosing: &Enclosing,
) -> Option<Declared<'t>> {
    match node.kind() {
        "function_definition" if *enclosing == Enclosing::Class => {
            named(parsed, node, SymbolKind::Method)
        }
        "function_definition" => named(parsed, node, SymbolKind::Function),
        "class_definition" => named(parsed, node, SymbolKind::Class),
        _ => None,
    }
}

fn classify_typescript<'t>(parsed: &ParseResult, node: Node<'t>) -> Option<Declared<'t>> {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            named(parsed, node, SymbolKind::Function)
        }
        "method_definition" => named(parsed, node, SymbolKind::Method),
        "class_declaration" | "abstract_class_declaration" => {
            named(parsed, node, SymbolKind::Class)
        }
        "interface_declaration" => named(parsed, node, SymbolKind::Interface),
        "enum_declaration" => named(parsed, node, SymbolKind::Enum),
        "type_alias_declaration" => named(parsed, node, SymbolKind::Type),
        "variable_declarator" => node
            .child_by_field_name("value")
            .filter(|value| {
                matches!(
                    value.kind(),
                    "arrow_function" | "function_expression" | "function"
                )
            })
            .and_then(|_| named(parsed, node, SymbolKind::Function)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use rstest::rstest;

    fn names(source: &str, language: SupportedLanguage) -> Vec<(String, SymbolKind, usize)> {
        let mut parser = Parser::new(language).expect("parser init");
        let parsed = parser.parse(source).expect("parse");
        let mut out = Vec::new();
        flatten(&outline(&parsed), 0, &mut out);
        out
    }

    fn flatten(
        symbols: &[DocumentSymbol],
        depth: usize,
        out: &mut Vec<(String, SymbolKind, usize)>,
    ) {
        for symbol in symbols {
            out.push((symbol.name.clone(), symbol.kind, depth));
            flatten(&symbol.children, depth + 1, out);
        }
    }

    fn entry(name: &str, kind: SymbolKind, depth: usize) -> (String, SymbolKind, usize) {
        (name.to_owned(), kind, depth)
    }

    #[test]
    fn go_outline_names_methods_by_receiver() {
        let source = "\
package main

type Server struct {
\taddr string
}

type Handler interface {
\tServe()
}

type ID int

func NewServer() *Server {
\treturn &Server{}
}

func (s *Server) Start() {
\tinner := func() {}
\tinner()
}

func (s Server) Addr() string {
\treturn s.addr
}
";
        assert_eq!(
            names(source, SupportedLanguage::Go),
            [
                entry("Server", SymbolKind::Struct, 0),
                entry("Handler", SymbolKind::Interface, 0),
                entry("ID", SymbolKind::Type, 0),
                entry("NewServer", SymbolKind::Function, 0),
                entry("(*Server).Start", SymbolKind::Method, 0),
                entry("(Server).Addr", SymbolKind::Method, 0),
            ]
        );
    }

    #[test]
    fn rust_outline_qualifies_impl_methods() {
        let source = "\
struct Repo;

trait Store {
    fn save(&self) {}
}

impl<T> Store for Wrapper<T> {}

impl Repo {
    fn open() -> Self {
        fn helper() {}
        helper();
        Repo
    }
}

enum Mode { A }

type Alias = Repo;
";
        assert_eq!(
            names(source, SupportedLanguage::Rust),
            [
                entry("Repo", SymbolKind::Struct, 0),
                entry("Store", SymbolKind::Interface, 0),
                entry("save", SymbolKind::Method, 1),
                entry("Repo::open", SymbolKind::Method, 0),
                entry("helper", SymbolKind::Function, 1),
                entry("Mode", SymbolKind::Enum, 0),
                entry("Alias", SymbolKind::Type, 0),
            ]
        );
    }

    #[test]
    fn python_outline_nests_methods_in_classes() {
        let source = "\
class Shape:
    def area(self):
        return 0

@cache
def build():
    def inner():
        pass
    return Shape()
";
        assert_eq!(
            names(source, SupportedLanguage::Python),
            [
                entry("Shape", SymbolKind::Class, 0),
                entry("area", SymbolKind::Method, 1),
                entry("build", SymbolKind::Function, 0),
                entry("inner", SymbolKind::Function, 1),
            ]
        );
    }

    #[rstest]
    #[case::declaration("function load(): void {}", "load", SymbolKind::Function)]
    #[case::arrow("const load = () => 1;", "load", SymbolKind::Function)]
    #[case::class("class Loader {}", "Loader", SymbolKind::Class)]
    #[case::interface("interface Options { depth: number }", "Options", SymbolKind::Interface)]
    #[case::alias("type Id = string;", "Id", SymbolKind::Type)]
    #[case::enumeration("enum Mode { A, B }", "Mode", SymbolKind::Enum)]
    fn typescript_declarations_are_recognised(
        #[case] source: &str,
        #[case] name: &str,
        #[case] kind: SymbolKind,
    ) {
        assert_eq!(
            names(source, SupportedLanguage::TypeScript),
            [entry(name, kind, 0)]
        );
    }

    #[test]
    fn typescript_methods_are_class_children() {
        let source = "class Loader {\n  load(): void {}\n}\n";
        assert_eq!(
            names(source, SupportedLanguage::TypeScript),
            [
                entry("Loader", SymbolKind::Class, 0),
                entry("load", SymbolKind::Method, 1),
            ]
        );
    }

    #[test]
    fn selection_range_covers_the_name() {
        let mut parser = Parser::new(SupportedLanguage::Go).expect("parser init");
        let parsed = parser
            .parse("package main\n\nfunc Run() {\n}\n")
            .expect("parse");
        let symbols = outline(&parsed);
        let run = symbols.first().expect("Run symbol");
        assert_eq!(run.range.start.line, 2);
        assert_eq!(run.range.end.line, 3);
        assert_eq!(run.selection_range.start.column, 5);
        assert_eq!(run.selection_range.end.column, 8);
    }
}
