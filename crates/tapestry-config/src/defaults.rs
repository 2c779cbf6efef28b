use crate::logging::LogFormat;

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default bound on call-order recursion depth.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 50;

/// Default log filter expression used by the binary.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
///
/// Tapestry is run interactively, so the human-readable format is preferred.
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default call-order recursion bound.
pub fn default_max_call_depth() -> usize {
    DEFAULT_MAX_CALL_DEPTH
}
