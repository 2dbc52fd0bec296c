//! Occupancy map of one floor
//!
//! Builds the grid the renderer draws: one cell per (column, row) with its
//! rack label and the lot stored there, if any.

use std::collections::HashMap;

use serde::Serialize;

use crate::core::position::{Floor, Position};
use crate::core::store::OccupiedSlot;

/// Background of a map cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellShade {
    Occupied,
    /// Empty cell in an even block (first, third)
    Tinted,
    /// Empty cell in an odd block
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapCell {
    #[serde(skip)]
    pub position: Position,
    pub id: String,
    pub label: String,
    pub lot: Option<String>,
    pub product: Option<String>,
}

impl MapCell {
    pub fn is_occupied(&self) -> bool {
        self.lot.is_some()
    }

    pub fn shade(&self) -> CellShade {
        if self.is_occupied() {
            CellShade::Occupied
        } else if self.position.block_index() % 2 == 0 {
            CellShade::Tinted
        } else {
            CellShade::Plain
        }
    }
}

/// All cells of a floor, column-major
#[derive(Debug, Clone, Serialize)]
pub struct OccupancyMap {
    pub floor: Floor,
    cells: Vec<MapCell>,
}

impl OccupancyMap {
    /// Lay out `floor` and mark the slots present in `occupied`
    ///
    /// Slots belonging to other floors or with unknown ids are ignored.
    pub fn build(floor: Floor, occupied: &[OccupiedSlot]) -> Self {
        let by_id: HashMap<&str, &OccupiedSlot> = occupied
            .iter()
            .map(|slot| (slot.position.as_str(), slot))
            .collect();

        let cells = Position::all(floor)
            .map(|position| {
                let id = position.id();
                let slot = by_id.get(id.as_str());
                MapCell {
                    position,
                    label: position.label(),
                    lot: slot.map(|s| s.lot.clone()),
                    product: slot.map(|s| s.product.clone()),
                    id,
                }
            })
            .collect();

        Self { floor, cells }
    }

    /// Cell at 1-based `column` and `row`
    pub fn cell(&self, column: u8, row: u8) -> Option<&MapCell> {
        if column == 0 || row == 0 || column > self.floor.columns() || row > self.floor.rows() {
            return None;
        }
        let idx = usize::from(column - 1) * usize::from(self.floor.rows()) + usize::from(row - 1);
        self.cells.get(idx)
    }

    pub fn cells(&self) -> &[MapCell] {
        &self.cells
    }

    /// Cells of one row, left to right
    pub fn row(&self, row: u8) -> impl Iterator<Item = &MapCell> {
        (1..=self.floor.columns()).filter_map(move |column| self.cell(column, row))
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }
}
