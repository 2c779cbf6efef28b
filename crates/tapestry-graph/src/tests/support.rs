//! Shared test helpers: an in-memory symbol resolver.

use std::collections::{HashMap, HashSet};

use camino::{Utf8Path, Utf8PathBuf};

use crate::factory::clean_name;
use crate::node::{Position, SourceRange, SymbolKind};
use crate::resolver::{DocumentSymbol, Location, SymbolResolver};
use crate::text::is_identifier_char;
use crate::GraphError;

/// Builds an outline entry spanning whole lines `start..=end`.
pub(super) fn symbol(name: &str, kind: SymbolKind, start: u32, end: u32) -> DocumentSymbol {
    DocumentSymbol::new(
        name,
        kind,
        SourceRange::new(Position::new(start, 0), Position::new(end, 1)),
    )
}

pub(super) fn function(name: &str, start: u32, end: u32) -> DocumentSymbol {
    symbol(name, SymbolKind::Function, start, end)
}

#[derive(Debug, Clone, Default)]
struct FakeFile {
    source: String,
    outline: Vec<DocumentSymbol>,
}

/// Resolver answering from registered files.
///
/// Definitions are found by name: the identifier under the requested
/// position is matched against the bare names of every registered symbol,
/// preferring the requesting file.
#[derive(Debug, Clone, Default)]
pub(super) struct FakeResolver {
    files: HashMap<Utf8PathBuf, FakeFile>,
    order: Vec<Utf8PathBuf>,
    unreadable: HashSet<Utf8PathBuf>,
    failing_names: HashSet<String>,
    pub(super) definition_requests: usize,
}

impl FakeResolver {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn with_file(
        mut self,
        path: &str,
        source: &str,
        outline: Vec<DocumentSymbol>,
    ) -> Self {
        let key = Utf8PathBuf::from(path);
        if !self.files.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.files.insert(
            key,
            FakeFile {
                source: source.to_owned(),
                outline,
            },
        );
        self
    }

    /// Makes `open_document` fail for `path` while its outline stays listed.
    pub(super) fn with_unreadable(mut self, path: &str) -> Self {
        self.unreadable.insert(Utf8PathBuf::from(path));
        self
    }

    /// Makes definition lookups of `name` fail with a resolver error.
    pub(super) fn with_failing_lookup(mut self, name: &str) -> Self {
        self.failing_names.insert(name.to_owned());
        self
    }

    fn identifier_at(&self, path: &Utf8Path, position: Position) -> Option<String> {
        let file = self.files.get(path)?;
        let line = file
            .source
            .lines()
            .nth(usize::try_from(position.line).ok()?)?;
        let start = usize::try_from(position.column).ok()?;
        let rest = line.get(start..)?;
        let end = rest
            .char_indices()
            .find(|(_, ch)| !is_identifier_char(*ch))
            .map_or(rest.len(), |(index, _)| index);
        let name = rest.get(..end)?;
        (!name.is_empty()).then(|| name.to_owned())
    }

    fn find_named(&self, name: &str, preferred: &Utf8Path) -> Option<Location> {
        let preferred_first = std::iter::once(preferred.to_owned()).chain(
            self.order
                .iter()
                .filter(|path| path.as_path() != preferred)
                .cloned(),
        );
        for path in preferred_first {
            let Some(file) = self.files.get(&path) else {
                continue;
            };
            if let Some(found) = find_in_outline(&file.outline, name) {
                return Some(Location::new(path, found.selection_range));
            }
        }
        None
    }
}

fn find_in_outline<'a>(symbols: &'a [DocumentSymbol], name: &str) -> Option<&'a DocumentSymbol> {
    symbols.iter().find_map(|symbol| {
        find_in_outline(&symbol.children, name)
            .or_else(|| (clean_name(&symbol.name).name == name).then_some(symbol))
    })
}

impl SymbolResolver for FakeResolver {
    fn list_symbols(&mut self, path: &Utf8Path) -> Result<Vec<DocumentSymbol>, GraphError> {
        self.files
            .get(path)
            .map(|file| file.outline.clone())
            .ok_or_else(|| GraphError::resolver(format!("unknown document {path}")))
    }

    fn resolve_definition(
        &mut self,
        path: &Utf8Path,
        position: Position,
    ) -> Result<Option<Location>, GraphError> {
        self.definition_requests += 1;
        let Some(name) = self.identifier_at(path, position) else {
            return Ok(None);
        };
        if self.failing_names.contains(&name) {
            return Err(GraphError::resolver(format!("lookup of {name} failed")));
        }
        Ok(self.find_named(&name, path))
    }

    fn open_document(&mut self, path: &Utf8Path) -> Result<String, GraphError> {
        if self.unreadable.contains(path) {
            return Err(GraphError::io(
                format!("failed to read {path}"),
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            ));
        }
        self.files
            .get(path)
            .map(|file| file.source.clone())
            .ok_or_else(|| {
                GraphError::io(
                    format!("failed to read {path}"),
                    std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
                )
            })
    }
}

pub(super) const SIMPLE_CALL: &str = "\
package main

func A() {
\tB()
}

func B() int {
\treturn 1
}
";

pub(super) const CONSUMED_CALL: &str = "\
package main

func A() {
\tx := B()
\t_ = x
}

func B() int {
\treturn 1
}
";

pub(super) const MUTUAL_RECURSION: &str = "\
package main

func A() {
\tB()
}

func B() {
\tA()
}
";

/// Outline shared by the three two-function fixtures above.
pub(super) fn two_functions(second_start: u32) -> Vec<DocumentSymbol> {
    vec![
        function("A", 2, second_start.saturating_sub(2)),
        function("B", second_start, second_start.saturating_add(2)),
    ]
}

pub(super) fn simple_call() -> FakeResolver {
    FakeResolver::new().with_file("/p/main.go", SIMPLE_CALL, two_functions(6))
}

pub(super) fn consumed_call() -> FakeResolver {
    FakeResolver::new().with_file("/p/main.go", CONSUMED_CALL, two_functions(7))
}

pub(super) fn mutual_recursion() -> FakeResolver {
    FakeResolver::new().with_file("/p/main.go", MUTUAL_RECURSION, two_functions(6))
}

pub(super) const VENDORED_CALL: &str = "\
package main

func Run() error {
\tlog(\"start\")
\treturn errors.New(\"boom\")
}

func log(msg string) {
\tfmt.Println(msg)
}
";

pub(super) const VENDORED_ERRORS: &str = "\
package errors

func New(text string) error {
\treturn &fundamental{msg: text}
}
";

pub(super) const STDLIB_FMT: &str = "\
package fmt

func Println(a ...any) (n int, err error) {
\treturn Fprintln(os.Stdout, a...)
}
";

pub(super) fn vendored_call() -> FakeResolver {
    FakeResolver::new()
        .with_file(
            "/p/main.go",
            VENDORED_CALL,
            vec![function("Run", 2, 5), function("log", 7, 9)],
        )
        .with_file(
            "/p/vendor/github.com/pkg/errors/errors.go",
            VENDORED_ERRORS,
            vec![function("New", 2, 4)],
        )
        .with_file(
            "/usr/local/go/src/fmt/print.go",
            STDLIB_FMT,
            vec![function("Println", 2, 4)],
        )
}

pub(super) const SHARED_TYPE: &str = "\
package shapes

type T struct {
\tN int
}

func F1() {
\tt := T{N: 1}
\tF2(t)
}

func F2(t T) T {
\treturn T{N: t.N + 1}
}
";

pub(super) fn shared_type() -> FakeResolver {
    FakeResolver::new().with_file(
        "/p/shapes.go",
        SHARED_TYPE,
        vec![
            symbol("T", SymbolKind::Struct, 2, 4),
            function("F1", 6, 9),
            function("F2", 11, 13),
        ],
    )
}

pub(super) const CROSS_FILE_MAIN: &str = "\
package main

func main() {
\tcfg := config.Load()
\tsrv := NewServer(cfg)
\tsrv.Start()
}
";

pub(super) const CROSS_FILE_SERVER: &str = "\
package main

type Server struct {
\tcfg Config
}

func NewServer(cfg Config) *Server {
\treturn &Server{cfg: cfg}
}

func (s *Server) Start() {
\ts.listen()
\tdefer s.Close()
}

func (s *Server) listen() {
}

func (s *Server) Close() error {
\treturn nil
}
";

pub(super) const CROSS_FILE_CONFIG: &str = "\
package config

type Config struct {
\tAddr string
}

func Load() Config {
\treturn Config{Addr: \":80\"}
}
";

pub(super) fn cross_file() -> FakeResolver {
    FakeResolver::new()
        .with_file(
            "/p/main.go",
            CROSS_FILE_MAIN,
            vec![function("main", 2, 6)],
        )
        .with_file(
            "/p/server.go",
            CROSS_FILE_SERVER,
            vec![
                symbol("Server", SymbolKind::Struct, 2, 4),
                function("NewServer", 6, 8),
                symbol("(*Server).Start", SymbolKind::Method, 10, 13),
                symbol("(*Server).listen", SymbolKind::Method, 15, 16),
                symbol("(*Server).Close", SymbolKind::Method, 18, 20),
            ],
        )
        .with_file(
            "/p/config/config.go",
            CROSS_FILE_CONFIG,
            vec![
                symbol("Config", SymbolKind::Struct, 2, 4),
                function("Load", 6, 8),
            ],
        )
}

pub(super) const CALL_CHAIN: &str = "\
package main

func A() {
\tB()
}

func B() {
\tC()
}

func C() {
\tD()
}

func D() {
\tE()
}

func E() {
}
";

/// `A -> B -> C -> D -> E`, one call per function.
pub(super) fn call_chain() -> FakeResolver {
    FakeResolver::new().with_file(
        "/p/chain.go",
        CALL_CHAIN,
        vec![
            function("A", 2, 4),
            function("B", 6, 8),
            function("C", 10, 12),
            function("D", 14, 16),
            function("E", 18, 19),
        ],
    )
}

pub(super) const SELF_RECURSION: &str = "\
package main

func A(n int) int {
\tif n == 0 {
\t\treturn B()
\t}
\treturn A(n - 1)
}

func B() int {
\treturn 0
}
";

pub(super) fn self_recursion() -> FakeResolver {
    FakeResolver::new().with_file(
        "/p/count.go",
        SELF_RECURSION,
        vec![function("A", 2, 7), function("B", 9, 11)],
    )
}
