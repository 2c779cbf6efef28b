//! Analysis scope classification.
//!
//! Definitions that resolve into standard libraries, vendored trees, or
//! package caches are outside the project and never become nodes. The check
//! is a path heuristic, not an error.

use camino::{Utf8Path, Utf8PathBuf};

/// Path fragments that mark a location as external to the project.
pub const DEFAULT_EXCLUDED_FRAGMENTS: &[&str] = &[
    "/vendor/",
    "/node_modules/",
    "/.cargo/registry/",
    "/.cargo/git/",
    "/.rustup/",
    "/rustlib/",
    "/go/pkg/mod/",
    "/usr/local/go/",
    "/usr/lib/go",
    "/site-packages/",
    "/dist-packages/",
    "/typeshed/",
    "/target/",
    "/lib/python",
];

/// Decides whether a resolved path belongs to the analysed project.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    workspace_root: Option<Utf8PathBuf>,
    excluded: Vec<String>,
}

impl Default for ScopeFilter {
    fn default() -> Self {
        Self {
            workspace_root: None,
            excluded: DEFAULT_EXCLUDED_FRAGMENTS
                .iter()
                .map(|fragment| (*fragment).to_owned())
                .collect(),
        }
    }
}

impl ScopeFilter {
    /// Creates a filter with the built-in exclusions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Treats every path outside `root` as external.
    #[must_use]
    pub fn with_workspace_root(mut self, root: impl Into<Utf8PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    /// Adds further excluded path fragments.
    #[must_use]
    pub fn with_exclusions<I, S>(mut self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(
            fragments
                .into_iter()
                .map(Into::into)
                .filter(|fragment: &String| !fragment.is_empty()),
        );
        self
    }

    /// Returns the configured workspace root.
    #[must_use]
    pub fn workspace_root(&self) -> Option<&Utf8Path> {
        self.workspace_root.as_deref()
    }

    /// Returns whether `path` lies outside the analysis scope.
    #[must_use]
    pub fn is_external(&self, path: &Utf8Path) -> bool {
        if let Some(root) = &self.workspace_root
            && !path.starts_with(root)
        {
            return true;
        }

        let normalised = path.as_str().replace('\\', "/");
        self.excluded
            .iter()
            .any(|fragment| normalised.contains(fragment.as_str()))
    }
}
