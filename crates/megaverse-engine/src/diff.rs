//! Goal vs. remote grid comparison

use megaverse_core::{is_space, split_token, Goal, Position, RemoteCell};

/// First difference found between the goal and the remote grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// Remote grid has a different number of rows
    RowCount { expected: usize, actual: usize },

    /// A remote row has a different number of columns
    ColumnCount {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A single cell disagrees with its goal token
    Cell {
        position: Position,
        expected: String,
        actual: String,
    },
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RowCount { expected, actual } => {
                write!(f, "expected {} rows, found {}", expected, actual)
            }
            Self::ColumnCount {
                row,
                expected,
                actual,
            } => write!(
                f,
                "row {}: expected {} columns, found {}",
                row, expected, actual
            ),
            Self::Cell {
                position,
                expected,
                actual,
            } => write!(f, "{}: expected {}, found {}", position, expected, actual),
        }
    }
}

/// Compare a remote grid against the goal, stopping at the first mismatch
///
/// Shape is checked in full before any cell. Modifiers are only compared when
/// both sides carry one: a remote cell without a color or direction is not
/// flagged even when the goal token names one.
pub fn diff_grids(goal: &Goal, remote: &[Vec<Option<RemoteCell>>]) -> Option<Mismatch> {
    let rows = goal.rows();

    if rows.len() != remote.len() {
        return Some(Mismatch::RowCount {
            expected: rows.len(),
            actual: remote.len(),
        });
    }

    for (row, (goal_row, remote_row)) in rows.iter().zip(remote).enumerate() {
        if goal_row.len() != remote_row.len() {
            return Some(Mismatch::ColumnCount {
                row,
                expected: goal_row.len(),
                actual: remote_row.len(),
            });
        }
    }

    for (row, (goal_row, remote_row)) in rows.iter().zip(remote).enumerate() {
        for (column, (token, cell)) in goal_row.iter().zip(remote_row).enumerate() {
            if !cell_matches(token, cell.as_ref()) {
                return Some(Mismatch::Cell {
                    position: Position::new(row, column),
                    expected: token.clone(),
                    actual: render_cell(cell.as_ref()),
                });
            }
        }
    }

    None
}

fn cell_matches(token: &str, cell: Option<&RemoteCell>) -> bool {
    let cell = match (is_space(token), cell) {
        (true, None) => return true,
        (true, Some(_)) | (false, None) => return false,
        (false, Some(cell)) => cell,
    };

    let Ok(kind) = cell.kind() else {
        return false;
    };

    let parts = split_token(token);
    if parts.name != kind.name() {
        return false;
    }

    if let (Some(actual), Some(expected)) = (cell.direction.as_deref(), parts.direction()) {
        if !actual.eq_ignore_ascii_case(expected) {
            return false;
        }
    }

    if let (Some(actual), Some(expected)) = (cell.color.as_deref(), parts.color()) {
        if !actual.eq_ignore_ascii_case(expected) {
            return false;
        }
    }

    true
}

/// Goal-style token for a remote cell (`SPACE`, `POLYANET`, `RED_SOLOON`, ...)
pub fn render_cell(cell: Option<&RemoteCell>) -> String {
    let Some(cell) = cell else {
        return "SPACE".to_string();
    };

    let name = match cell.kind() {
        Ok(kind) => kind.name().to_string(),
        Err(_) => format!("UNKNOWN({})", cell.type_code),
    };

    match (cell.color.as_deref(), cell.direction.as_deref()) {
        (Some(color), _) => format!("{}_{}", color.to_uppercase(), name),
        (None, Some(direction)) => format!("{}_{}", direction.to_uppercase(), name),
        (None, None) => name,
    }
}

/// Render a whole remote grid as goal-style tokens
pub fn render_grid(remote: &[Vec<Option<RemoteCell>>]) -> Vec<Vec<String>> {
    remote
        .iter()
        .map(|row| row.iter().map(|cell| render_cell(cell.as_ref())).collect())
        .collect()
}
