//! Shared position conversion helpers.
//!
//! Tree-sitter positions are zero-based rows and byte columns, which is what
//! the engine's [`Position`] uses. For user-facing messages, we prefer
//! one-based line and column numbers.

use tapestry_graph::{Position, SourceRange};

fn clamp(value: usize) -> u32 {
    // Line/column numbers will realistically never exceed u32::MAX.
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Converts a Tree-sitter position (0-based) to one-based display coordinates.
#[must_use]
pub(crate) fn point_to_one_based(pos: tree_sitter::Point) -> (u32, u32) {
    (
        clamp(pos.row.saturating_add(1)),
        clamp(pos.column.saturating_add(1)),
    )
}

/// Converts a Tree-sitter position to an engine position.
#[must_use]
pub(crate) fn point_to_position(pos: tree_sitter::Point) -> Position {
    Position::new(clamp(pos.row), clamp(pos.column))
}

/// Converts an engine position to a Tree-sitter position.
#[must_use]
pub(crate) fn position_to_point(position: Position) -> tree_sitter::Point {
    tree_sitter::Point {
        row: usize::try_from(position.line).unwrap_or(usize::MAX),
        column: usize::try_from(position.column).unwrap_or(usize::MAX),
    }
}

/// Returns the zero-based extent of a node.
#[must_use]
pub(crate) fn node_range(node: tree_sitter::Node<'_>) -> SourceRange {
    SourceRange::new(
        point_to_position(node.start_position()),
        point_to_position(node.end_position()),
    )
}
