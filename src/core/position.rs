//! Rack position naming
//!
//! The câmara is a grid of 9 columns on two floors. Rows are grouped into
//! four blocks per floor and the block number is embedded in the rack label:
//!
//! - Upper floor (2): 12 rows, blocks of 3
//! - Lower floor (1): 8 rows, blocks of 2
//!
//! Blocks are numbered 4 down to 1 as the row increases. A label alone is
//! shared by every row of a block, so the storage identifier appends the row:
//! `R524_1` is column 5, floor 2, block 4, row 1.

use std::fmt;
use std::str::FromStr;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of rack columns on each floor
pub const COLUMNS: u8 = 9;

/// Number of row blocks on each floor
pub const BLOCKS: u8 = 4;

/// A physical floor of the câmara
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Floor {
    /// Ground level, 8 rows
    Lower,
    /// Upper level, 12 rows
    #[default]
    Upper,
}

impl Floor {
    pub const ALL: [Floor; 2] = [Floor::Upper, Floor::Lower];

    /// Floor number as used in labels (1 or 2)
    pub fn number(self) -> u8 {
        match self {
            Floor::Lower => 1,
            Floor::Upper => 2,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Floor::Lower),
            2 => Some(Floor::Upper),
            _ => None,
        }
    }

    /// Rows sharing one block number
    pub fn block_size(self) -> u8 {
        match self {
            Floor::Upper => 3,
            Floor::Lower => 2,
        }
    }

    pub fn rows(self) -> u8 {
        self.block_size() * BLOCKS
    }

    pub fn columns(self) -> u8 {
        COLUMNS
    }

    /// Total addressable positions on this floor
    pub fn capacity(self) -> usize {
        usize::from(self.rows()) * usize::from(self.columns())
    }

    pub fn toggle(self) -> Self {
        match self {
            Floor::Lower => Floor::Upper,
            Floor::Upper => Floor::Lower,
        }
    }

    /// Human-readable floor name shown in the map header
    pub fn display_name(self) -> &'static str {
        match self {
            Floor::Lower => "Lower floor",
            Floor::Upper => "Upper floor",
        }
    }
}

impl fmt::Display for Floor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl From<Floor> for u8 {
    fn from(floor: Floor) -> Self {
        floor.number()
    }
}

impl TryFrom<u8> for Floor {
    type Error = PositionError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Floor::from_number(n).ok_or(PositionError::InvalidFloor(n))
    }
}

impl FromStr for Floor {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "lower" => Ok(Floor::Lower),
            "2" | "upper" => Ok(Floor::Upper),
            other => Err(PositionError::Malformed(other.to_string())),
        }
    }
}

/// Block number for a row: `4 - (row - 1) / block_size`
///
/// Rows start at 1. The result is clamped to `1..=4`: row 0 counts as the
/// first row, rows past the floor fall in block 1, and a zero block size is
/// treated as 1.
pub fn compute_block(row: u8, block_size: u8) -> u8 {
    debug_assert!(block_size > 0, "block size must be positive");
    let offset = row.saturating_sub(1) / block_size.max(1);
    BLOCKS - offset.min(BLOCKS - 1)
}

/// Rack label `R{column}{floor}{block}`
pub fn rack_label(floor: Floor, column: u8, row: u8) -> String {
    format!(
        "R{}{}{}",
        column,
        floor.number(),
        compute_block(row, floor.block_size())
    )
}

/// Errors from parsing or building a position
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum PositionError {
    #[error("invalid floor {0} (expected 1 or 2)")]
    #[diagnostic(code(camara::position::floor))]
    InvalidFloor(u8),

    #[error("column {column} out of range 1..={max}")]
    #[diagnostic(code(camara::position::column))]
    ColumnOutOfRange { column: u8, max: u8 },

    #[error("row {row} out of range 1..={max} on floor {floor}")]
    #[diagnostic(code(camara::position::row))]
    RowOutOfRange { floor: Floor, row: u8, max: u8 },

    #[error("cannot parse position '{0}'")]
    #[diagnostic(
        code(camara::position::malformed),
        help("use a position id like R524_1 or floor:column:row like 2:5:1")
    )]
    Malformed(String),

    #[error("position '{id}' names block {found} but row {row} belongs to block {expected}")]
    #[diagnostic(code(camara::position::inconsistent))]
    Inconsistent {
        id: String,
        row: u8,
        found: u8,
        expected: u8,
    },
}

/// A single addressable rack slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    floor: Floor,
    column: u8,
    row: u8,
}

impl Position {
    /// Build a position, checking the column and row against the floor layout
    pub fn new(floor: Floor, column: u8, row: u8) -> Result<Self, PositionError> {
        if column == 0 || column > floor.columns() {
            return Err(PositionError::ColumnOutOfRange {
                column,
                max: floor.columns(),
            });
        }
        if row == 0 || row > floor.rows() {
            return Err(PositionError::RowOutOfRange {
                floor,
                row,
                max: floor.rows(),
            });
        }
        Ok(Self { floor, column, row })
    }

    pub fn floor(&self) -> Floor {
        self.floor
    }

    pub fn column(&self) -> u8 {
        self.column
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn block(&self) -> u8 {
        compute_block(self.row, self.floor.block_size())
    }

    /// Zero-based block index counted from the first row, used for shading
    pub fn block_index(&self) -> u8 {
        (self.row - 1) / self.floor.block_size()
    }

    /// Whether this row opens a new block
    pub fn starts_block(&self) -> bool {
        (self.row - 1) % self.floor.block_size() == 0
    }

    pub fn label(&self) -> String {
        rack_label(self.floor, self.column, self.row)
    }

    /// Storage key: label plus row, e.g. `R524_1`
    pub fn id(&self) -> String {
        format!("{}_{}", self.label(), self.row)
    }

    /// Every position of a floor, column by column
    pub fn all(floor: Floor) -> impl Iterator<Item = Position> {
        (1..=floor.columns()).flat_map(move |column| {
            (1..=floor.rows()).map(move |row| Position { floor, column, row })
        })
    }

    fn parse_id(s: &str) -> Result<Self, PositionError> {
        let malformed = || PositionError::Malformed(s.to_string());

        let (label, row) = s.split_once('_').ok_or_else(malformed)?;
        let digits = label
            .strip_prefix('R')
            .or_else(|| label.strip_prefix('r'))
            .ok_or_else(malformed)?;
        let digits: Vec<u8> = digits
            .chars()
            .map(|c| c.to_digit(10).map(|d| d as u8))
            .collect::<Option<_>>()
            .ok_or_else(malformed)?;
        if digits.len() != 3 {
            return Err(malformed());
        }
        let row: u8 = row.parse().map_err(|_| malformed())?;

        let floor = Floor::try_from(digits[1])?;
        let position = Position::new(floor, digits[0], row)?;
        if position.block() != digits[2] {
            return Err(PositionError::Inconsistent {
                id: s.to_string(),
                row,
                found: digits[2],
                expected: position.block(),
            });
        }
        Ok(position)
    }

    fn parse_triple(s: &str) -> Result<Self, PositionError> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        let [floor, column, row] = parts.as_slice() else {
            return Err(PositionError::Malformed(s.to_string()));
        };
        let number = |p: &str| {
            p.parse::<u8>()
                .map_err(|_| PositionError::Malformed(s.to_string()))
        };
        let floor = Floor::try_from(number(floor)?)?;
        Position::new(floor, number(column)?, number(row)?)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Position {
    type Err = PositionError;

    /// Accepts `R524_1` or `2:5:1`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains(':') {
            Self::parse_triple(s)
        } else {
            Self::parse_id(s)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_sizes() {
        assert_eq!(Floor::Upper.block_size(), 3);
        assert_eq!(Floor::Lower.block_size(), 2);
        assert_eq!(Floor::Upper.rows(), 12);
        assert_eq!(Floor::Lower.rows(), 8);
        assert_eq!(Floor::Upper.columns(), 9);
        assert_eq!(Floor::Lower.capacity(), 72);
    }

    #[test]
    fn test_upper_floor_blocks_descend_in_runs_of_three() {
        let blocks: Vec<u8> = (1..=12).map(|row| compute_block(row, 3)).collect();
        assert_eq!(blocks, vec![4, 4, 4, 3, 3, 3, 2, 2, 2, 1, 1, 1]);
        assert!(blocks.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_lower_floor_blocks_descend_in_runs_of_two() {
        let blocks: Vec<u8> = (1..=8).map(|row| compute_block(row, 2)).collect();
        assert_eq!(blocks, vec![4, 4, 3, 3, 2, 2, 1, 1]);
    }

    #[test]
    fn test_block_clamped_outside_floor_rows() {
        assert_eq!(compute_block(0, 3), 4);
        assert_eq!(compute_block(13, 3), 1);
        assert_eq!(compute_block(u8::MAX, 2), 1);
        assert_eq!(rack_label(Floor::Lower, 7, 0), "R714");
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_zero_block_size_does_not_divide_by_zero() {
        assert_eq!(compute_block(1, 0), 4);
        assert_eq!(compute_block(3, 0), 2);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "block size must be positive")]
    fn test_zero_block_size_asserts_in_debug() {
        compute_block(1, 0);
    }

    #[test]
    fn test_block_independent_of_column() {
        for floor in Floor::ALL {
            for row in 1..=floor.rows() {
                let expected = Position::new(floor, 1, row).unwrap().block();
                for column in 2..=floor.columns() {
                    assert_eq!(Position::new(floor, column, row).unwrap().block(), expected);
                }
            }
        }
    }

    #[test]
    fn test_rack_labels() {
        assert_eq!(rack_label(Floor::Upper, 5, 1), "R524");
        assert_eq!(rack_label(Floor::Upper, 5, 4), "R523");
        assert_eq!(rack_label(Floor::Upper, 9, 12), "R921");
        assert_eq!(rack_label(Floor::Lower, 1, 3), "R113");
        assert_eq!(rack_label(Floor::Lower, 7, 8), "R711");
    }

    #[test]
    fn test_position_id_appends_row() {
        let pos = Position::new(Floor::Upper, 5, 2).unwrap();
        assert_eq!(pos.label(), "R524");
        assert_eq!(pos.id(), "R524_2");
        assert_eq!(pos.to_string(), "R524_2");
    }

    #[test]
    fn test_ids_unique_per_floor() {
        for floor in Floor::ALL {
            let ids: std::collections::HashSet<String> =
                Position::all(floor).map(|p| p.id()).collect();
            assert_eq!(ids.len(), floor.capacity());
        }
    }

    #[test]
    fn test_all_is_column_major() {
        let first: Vec<String> = Position::all(Floor::Lower).take(3).map(|p| p.id()).collect();
        assert_eq!(first, vec!["R114_1", "R114_2", "R113_3"]);
    }

    #[test]
    fn test_parse_id() {
        let pos: Position = "R524_1".parse().unwrap();
        assert_eq!(pos.floor(), Floor::Upper);
        assert_eq!(pos.column(), 5);
        assert_eq!(pos.row(), 1);

        let pos: Position = "r113_3".parse().unwrap();
        assert_eq!(pos, Position::new(Floor::Lower, 1, 3).unwrap());
    }

    #[test]
    fn test_parse_triple() {
        let pos: Position = "2:5:4".parse().unwrap();
        assert_eq!(pos.id(), "R523_4");
    }

    #[test]
    fn test_parse_rejects_wrong_block() {
        let err = "R521_1".parse::<Position>().unwrap_err();
        assert!(matches!(err, PositionError::Inconsistent { expected: 4, found: 1, .. }));
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(matches!(
            "1:1:9".parse::<Position>(),
            Err(PositionError::RowOutOfRange { max: 8, .. })
        ));
        assert!(matches!(
            "2:0:1".parse::<Position>(),
            Err(PositionError::ColumnOutOfRange { .. })
        ));
        assert_eq!(
            "3:1:1".parse::<Position>(),
            Err(PositionError::InvalidFloor(3))
        );
        assert!(matches!(
            "banana".parse::<Position>(),
            Err(PositionError::Malformed(_))
        ));
        assert!(matches!(
            "R52_1".parse::<Position>(),
            Err(PositionError::Malformed(_))
        ));
    }

    #[test]
    fn test_floor_toggle_and_parse() {
        assert_eq!(Floor::Upper.toggle(), Floor::Lower);
        assert_eq!(Floor::Lower.toggle(), Floor::Upper);
        assert_eq!("1".parse::<Floor>().unwrap(), Floor::Lower);
        assert_eq!("upper".parse::<Floor>().unwrap(), Floor::Upper);
        assert_eq!(Floor::default(), Floor::Upper);
    }

    #[test]
    fn test_block_shading_helpers() {
        let pos = Position::new(Floor::Upper, 1, 4).unwrap();
        assert_eq!(pos.block_index(), 1);
        assert!(pos.starts_block());
        let pos = Position::new(Floor::Upper, 1, 5).unwrap();
        assert!(!pos.starts_block());
    }
}
