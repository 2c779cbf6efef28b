//! Shared fixtures for CLI tests.

use std::ffi::OsString;
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use tapestry_config::Config;
use tempfile::TempDir;

use crate::{AppError, ConfigLoader, IoStreams, run_with_loader};

/// Loader returning a fixed configuration, recording what it was given.
pub(super) struct StubLoader {
    pub(super) config: Config,
    pub(super) seen: std::cell::RefCell<Vec<OsString>>,
}

impl StubLoader {
    pub(super) fn new(config: Config) -> Self {
        Self {
            config,
            seen: std::cell::RefCell::new(Vec::new()),
        }
    }
}

impl ConfigLoader for StubLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        self.seen.borrow_mut().extend(args.iter().cloned());
        Ok(self.config.clone())
    }
}

/// A Go module written to a temporary directory.
pub(super) struct GoModule {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl GoModule {
    pub(super) fn new() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("tapestry")
            .tempdir()
            .expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 temp dir");
        let files = [
            ("go.mod", "module example.com/app\n"),
            (
                "main.go",
                "package main\n\nfunc main() {\n\tcfg := load()\n\trun(cfg)\n}\n",
            ),
            (
                "run.go",
                "package main\n\ntype Options struct {\n\tdepth int\n}\n\nfunc load() Options {\n\treturn Options{depth: 1}\n}\n\nfunc run(opts Options) {\n}\n",
            ),
        ];
        for (name, contents) in files {
            std::fs::write(root.join(name), contents).expect("write fixture");
        }
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn path(&self, name: &str) -> String {
        self.root.join(name).into_string()
    }
}

/// Exit code and captured streams of one CLI run.
pub(super) struct Outcome {
    pub(super) code: ExitCode,
    pub(super) stdout: String,
    pub(super) stderr: String,
}

/// Runs the CLI with `args` after the program name.
pub(super) fn invoke(loader: &StubLoader, args: &[&str]) -> Outcome {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let code = {
        let mut io = IoStreams::new(&mut stdout, &mut stderr);
        run_with_loader(
            std::iter::once("tapestry")
                .chain(args.iter().copied())
                .map(OsString::from),
            &mut io,
            loader,
        )
    };
    Outcome {
        code,
        stdout: String::from_utf8(stdout).expect("stdout utf8"),
        stderr: String::from_utf8(stderr).expect("stderr utf8"),
    }
}
