//! On-disk workspaces used by the end-to-end suite.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// A temporary workspace whose files are removed on drop.
pub struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    /// Writes `files` (relative path, contents) below a fresh directory.
    pub fn new(files: &[(&str, &str)]) -> Self {
        let dir = tempfile::Builder::new()
            .prefix("tapestry")
            .tempdir()
            .unwrap_or_else(|err| panic!("temp dir: {err}"));
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .unwrap_or_else(|path| panic!("non UTF-8 temp dir: {}", path.display()));
        for (relative, contents) in files {
            let path = root.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap_or_else(|err| panic!("mkdir: {err}"));
            }
            std::fs::write(&path, contents).unwrap_or_else(|err| panic!("write {path}: {err}"));
        }
        Self { _dir: dir, root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }
}

pub const GO_MAIN: &str = "\
package main

import \"example.com/app/config\"

func main() {
\tcfg := config.Load()
\tsrv := NewServer(cfg)
\tsrv.Start()
}
";

pub const GO_SERVER: &str = "\
package main

import \"example.com/app/config\"

type Server struct {
\tcfg config.Config
}

func NewServer(cfg config.Config) *Server {
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

pub const GO_CONFIG: &str = "\
package config

type Config struct {
\tAddr string
}

func Load() Config {
\treturn Config{Addr: \":80\"}
}
";

pub fn go_service() -> Workspace {
    Workspace::new(&[
        ("main.go", GO_MAIN),
        ("server.go", GO_SERVER),
        ("config/config.go", GO_CONFIG),
        ("README.md", "# service\n"),
    ])
}

pub const RUST_REPO: &str = "\
pub struct Repo {
    path: String,
}

impl Repo {
    pub fn open(path: &str) -> Repo {
        let repo = Repo::build(path);
        repo.validate();
        repo
    }

    fn build(path: &str) -> Repo {
        Repo { path: path.to_owned() }
    }

    fn validate(&self) {
        log_check(&self.path);
    }
}

fn log_check(path: &str) {
    println!(\"{path}\");
}
";

pub fn rust_repo() -> Workspace {
    Workspace::new(&[("src/lib.rs", RUST_REPO)])
}
