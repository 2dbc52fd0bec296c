//! Terminal rendering of the occupancy map and records
//!
//! The map is drawn row by row with columns across, two text lines per
//! cell (rack label, then lot). Occupied cells are red; empty cells
//! alternate shading per block and a blank line separates blocks.

use console::style;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_csv, format_date, or_dash, truncate_str};
use crate::core::{CellShade, MapCell, OccupancyMap, OccupiedSlot, PalletRecord};

/// Width of one map cell in characters
const CELL_WIDTH: usize = 12;

/// Render the whole map of one floor
pub fn render_map(map: &OccupancyMap) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{}  {}\n\n",
        style(map.floor.display_name()).bold(),
        style(format!("{}/{} occupied", map.occupied(), map.capacity())).dim()
    ));

    for row in 1..=map.floor.rows() {
        let cells: Vec<&MapCell> = map.row(row).collect();
        if row > 1 && cells.first().is_some_and(|c| c.position.starts_block()) {
            out.push('\n');
        }

        let labels: Vec<String> = cells.iter().map(|c| paint(c, &c.label)).collect();
        let lots: Vec<String> = cells
            .iter()
            .map(|c| paint(c, c.lot.as_deref().unwrap_or("")))
            .collect();
        out.push_str(&labels.join(" "));
        out.push('\n');
        out.push_str(&lots.join(" "));
        out.push('\n');
    }

    out
}

/// Pad `text` to the cell width and color it by the cell's shade
fn paint(cell: &MapCell, text: &str) -> String {
    let padded = format!(
        " {:<width$}",
        truncate_str(text, CELL_WIDTH - 1),
        width = CELL_WIDTH - 1
    );
    match cell.shade() {
        CellShade::Occupied => style(padded).white().on_red().bold().to_string(),
        CellShade::Tinted => style(padded).black().on_cyan().to_string(),
        CellShade::Plain => style(padded).to_string(),
    }
}

/// Detail block for one pallet
pub fn render_record(record: &PalletRecord) -> String {
    format!(
        "{}  {}\n  Lot:      {}\n  Product:  {}\n  Stock:    {}\n  Notes:    {}\n  Entered:  {}\n",
        style("Position").bold(),
        style(&record.position).cyan(),
        style(&record.lot).yellow(),
        or_dash(&record.product),
        or_dash(&record.stock),
        or_dash(&record.notes),
        format_date(record.entry_date),
    )
}

/// Table of occupied slots
pub fn render_slots(slots: &[OccupiedSlot]) -> String {
    let mut table = Builder::default();
    table.push_record(["Position", "Lot", "Product"]);
    for slot in slots {
        table.push_record([
            slot.position.as_str(),
            slot.lot.as_str(),
            or_dash(&slot.product),
        ]);
    }
    table.build().with(Style::rounded()).to_string()
}

/// Table of full records
pub fn render_records(records: &[PalletRecord]) -> String {
    let mut table = Builder::default();
    table.push_record(["Position", "Lot", "Product", "Stock", "Notes", "Entered"]);
    for record in records {
        table.push_record([
            record.position.clone(),
            record.lot.clone(),
            truncate_str(or_dash(&record.product), 30),
            or_dash(&record.stock).to_string(),
            truncate_str(or_dash(&record.notes), 30),
            format_date(record.entry_date),
        ]);
    }
    table.build().with(Style::rounded()).to_string()
}

/// Occupied slots as tab- or comma-separated lines with a header
pub fn delimited_slots(slots: &[OccupiedSlot], csv: bool) -> String {
    let rows = slots
        .iter()
        .map(|s| vec![s.position.clone(), s.lot.clone(), s.product.clone()]);
    delimited(&["position", "lot", "product"], rows, csv)
}

/// Full records as tab- or comma-separated lines with a header
pub fn delimited_records(records: &[PalletRecord], csv: bool) -> String {
    let rows = records.iter().map(|r| {
        vec![
            r.position.clone(),
            r.lot.clone(),
            r.product.clone(),
            r.stock.clone(),
            r.notes.clone(),
            r.entry_date.map(|d| d.to_string()).unwrap_or_default(),
        ]
    });
    delimited(
        &["position", "lot", "product", "stock", "notes", "entry_date"],
        rows,
        csv,
    )
}

/// Every cell of a map, occupied or not, as tab- or comma-separated lines
pub fn delimited_map(map: &OccupancyMap, csv: bool) -> String {
    let rows = map.cells().iter().map(|c| {
        vec![
            c.id.clone(),
            c.label.clone(),
            c.position.column().to_string(),
            c.position.row().to_string(),
            c.lot.clone().unwrap_or_default(),
        ]
    });
    delimited(&["position", "label", "column", "row", "lot"], rows, csv)
}

/// Tab fields have tabs and line breaks flattened to spaces; csv fields are quoted
fn delimited(header: &[&str], rows: impl Iterator<Item = Vec<String>>, csv: bool) -> String {
    let sep = if csv { "," } else { "\t" };
    let mut out = header.join(sep);
    out.push('\n');
    for row in rows {
        let fields: Vec<String> = row
            .into_iter()
            .map(|f| if csv { escape_csv(&f) } else { f.replace(['\t', '\r', '\n'], " ") })
            .collect();
        out.push_str(&fields.join(sep));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Floor;
    use console::strip_ansi_codes;

    fn slot(position: &str, lot: &str) -> OccupiedSlot {
        OccupiedSlot {
            position: position.to_string(),
            lot: lot.to_string(),
            product: "Queijo".to_string(),
        }
    }

    #[test]
    fn test_render_upper_map() {
        let map = OccupancyMap::build(Floor::Upper, &[slot("R524_1", "L-77")]);
        let text = strip_ansi_codes(&render_map(&map)).to_string();

        assert!(text.starts_with("Upper floor"));
        assert!(text.contains("1/108 occupied"));
        assert!(text.contains("R524"));
        assert!(text.contains("L-77"));
        assert!(text.contains("R921"));

        // header + blank + 12 rows * 2 lines + 3 block separators
        assert_eq!(text.lines().count(), 2 + 24 + 3);
    }

    #[test]
    fn test_render_lower_map_block_breaks() {
        let map = OccupancyMap::build(Floor::Lower, &[]);
        let text = strip_ansi_codes(&render_map(&map)).to_string();
        assert!(text.starts_with("Lower floor"));
        assert_eq!(text.lines().count(), 2 + 16 + 3);
        let first_row = text.lines().nth(2).unwrap();
        assert!(first_row.trim_start().starts_with("R114"));
        assert!(first_row.contains("R914"));
    }

    #[test]
    fn test_render_record() {
        let record = PalletRecord {
            id: 1,
            position: "R524_1".to_string(),
            lot: "L1".to_string(),
            product: "Queijo".to_string(),
            stock: String::new(),
            notes: "frágil".to_string(),
            entry_date: chrono::NaiveDate::from_ymd_opt(2024, 5, 2),
        };
        let text = strip_ansi_codes(&render_record(&record)).to_string();
        assert!(text.contains("R524_1"));
        assert!(text.contains("Product:  Queijo"));
        assert!(text.contains("Stock:    -"));
        assert!(text.contains("2024-05-02"));
    }

    #[test]
    fn test_render_slots_table() {
        let text = render_slots(&[slot("R524_1", "L1"), slot("R113_3", "L2")]);
        assert!(text.contains("Position"));
        assert!(text.contains("R113_3"));
        assert!(text.contains("L2"));
    }

    #[test]
    fn test_delimited_slots() {
        let slots = vec![OccupiedSlot {
            position: "R113_3".to_string(),
            lot: "L1".to_string(),
            product: "Queijo, minas".to_string(),
        }];
        assert_eq!(
            delimited_slots(&slots, true),
            "position,lot,product\nR113_3,L1,\"Queijo, minas\"\n"
        );
        assert_eq!(
            delimited_slots(&slots, false),
            "position\tlot\tproduct\nR113_3\tL1\tQueijo, minas\n"
        );
    }

    #[test]
    fn test_delimited_map_flattens_tabs_in_lots() {
        let map = OccupancyMap::build(Floor::Lower, &[slot("R114_1", "L\t1\nB")]);
        let text = delimited_map(&map, false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "position\tlabel\tcolumn\trow\tlot");
        assert_eq!(lines.len(), 1 + 72);
        assert!(lines.contains(&"R114_1\tR114\t1\t1\tL 1 B"));
        assert!(lines.iter().all(|l| l.split('\t').count() == 5));
    }

    #[test]
    fn test_delimited_map_csv_quotes_lots() {
        let map = OccupancyMap::build(Floor::Upper, &[slot("R524_1", "L,1")]);
        let text = delimited_map(&map, true);
        assert!(text.starts_with("position,label,column,row,lot\n"));
        assert!(text.contains("R524_1,R524,5,1,\"L,1\"\n"));
        assert!(text.contains("R921_12,R921,9,12,\n"));
    }

    #[test]
    fn test_delimited_single_record() {
        let record = PalletRecord {
            id: 1,
            position: "R524_1".to_string(),
            lot: "L1".to_string(),
            product: "Queijo\tminas".to_string(),
            stock: "3".to_string(),
            notes: "linha 1\r\nlinha 2".to_string(),
            entry_date: chrono::NaiveDate::from_ymd_opt(2024, 5, 2),
        };
        let text = delimited_records(std::slice::from_ref(&record), false);
        assert_eq!(
            text,
            "position\tlot\tproduct\tstock\tnotes\tentry_date\n\
             R524_1\tL1\tQueijo minas\t3\tlinha 1  linha 2\t2024-05-02\n"
        );
    }
}
