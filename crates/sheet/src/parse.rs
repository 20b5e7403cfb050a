// CSV export parsing and column projection

use crate::{SheetError, SheetRow};

/// Parse the CSV export into rows.
///
/// At most `max_rows + 1` records are kept so `max_rows` bounds data rows
/// with the header still present; truncation happens before the header is
/// stripped. `max_rows == 0` means no cap.
pub fn parse_rows(text: &str, max_rows: u32) -> Result<Vec<SheetRow>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let cap = if max_rows == 0 { usize::MAX } else { max_rows as usize + 1 };

    let mut rows: Vec<SheetRow> = Vec::new();
    for result in reader.records() {
        if rows.len() >= cap {
            break;
        }
        let record = result.map_err(|e| format!("malformed csv: {}", e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(rows)
}

/// Project one column out of the data rows, header excluded.
///
/// A missing cell projects to the empty string; empty projections are
/// dropped, matching the widget's "usable value" notion.
pub fn project_column(rows: &[SheetRow], column_index: u32) -> Vec<String> {
    rows.iter()
        .skip(1)
        .map(|row| {
            row.get(column_index as usize)
                .map(|cell| cell.trim().to_string())
                .unwrap_or_default()
        })
        .filter(|value| !value.is_empty())
        .collect()
}

/// Projection that raises the empty-sheet condition.
///
/// A successful fetch with zero usable values is [`SheetError::EmptyDataset`],
/// not a fetch failure.
pub fn usable_items(rows: &[SheetRow], column_index: u32) -> Result<Vec<String>, SheetError> {
    let items = project_column(rows, column_index);
    if items.is_empty() {
        return Err(SheetError::EmptyDataset);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_fields_with_commas() {
        let rows = parse_rows("Name,City\n\"Doe, Jane\",\"Paris, FR\"\nBob,London\n", 0).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["Doe, Jane", "Paris, FR"]);
        assert_eq!(rows[2], vec!["Bob", "London"]);
    }

    #[test]
    fn ragged_rows_are_kept() {
        let rows = parse_rows("Name,Age\nAlice\nBob,25,extra\n", 0).unwrap();
        assert_eq!(rows[1], vec!["Alice"]);
        assert_eq!(rows[2], vec!["Bob", "25", "extra"]);
    }

    #[test]
    fn max_rows_bounds_data_rows_not_total() {
        // Header + 2 data rows kept: the cap counts data rows only.
        let text = "Name\nAlice\nBob\nCarol\nDave\n";
        let rows = parse_rows(text, 2).unwrap();
        assert_eq!(rows.len(), 3, "header plus two data rows");
        assert_eq!(rows[0], vec!["Name"]);
        assert_eq!(rows[2], vec!["Bob"]);
    }

    #[test]
    fn max_rows_zero_means_uncapped() {
        let text = "Name\nAlice\nBob\nCarol\n";
        let rows = parse_rows(text, 0).unwrap();
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn projection_skips_header_and_fills_missing() {
        let rows = vec![
            vec!["Name".to_string(), "City".to_string()],
            vec!["Alice".to_string(), "Paris".to_string()],
            vec!["Bob".to_string()],
            vec!["Carol".to_string(), "London".to_string()],
        ];

        // Column 1 is missing for Bob; the empty projection is dropped.
        assert_eq!(project_column(&rows, 1), vec!["Paris", "London"]);
        assert_eq!(project_column(&rows, 0), vec!["Alice", "Bob", "Carol"]);
    }

    #[test]
    fn projection_out_of_range_column_yields_nothing() {
        let rows = vec![
            vec!["Name".to_string()],
            vec!["Alice".to_string()],
        ];
        assert!(project_column(&rows, 7).is_empty());
    }

    #[test]
    fn projection_trims_whitespace_cells() {
        let rows = vec![
            vec!["Name".to_string()],
            vec!["  Alice  ".to_string()],
            vec!["   ".to_string()],
        ];
        assert_eq!(project_column(&rows, 0), vec!["Alice"]);
    }

    #[test]
    fn usable_items_empty_is_an_error() {
        let rows = vec![vec!["Name".to_string()]];
        assert_eq!(usable_items(&rows, 0), Err(SheetError::EmptyDataset));

        let rows: Vec<SheetRow> = Vec::new();
        assert_eq!(usable_items(&rows, 0), Err(SheetError::EmptyDataset));
    }

    #[test]
    fn usable_items_passes_values_through() {
        let rows = vec![
            vec!["Name".to_string()],
            vec!["Alice".to_string()],
            vec!["Alicia".to_string()],
        ];
        assert_eq!(usable_items(&rows, 0).unwrap(), vec!["Alice", "Alicia"]);
    }
}
