use crate::error::{DashboardError, Result};
use crate::schema::{
    canonical_area, cell_number, DatasetSchema, AREA_NAME, CATEGORICAL, GROUP_NAME, OVERALL,
    REGION_ALIASES, SUB_GROUP_NAME, YEAR,
};
use crate::types::{Cell, NormalizedRecord, NormalizedTable, RawTable};
use crate::util::parse_year_safe;

/// Turn an arbitrary crime dataset into uniform records.
///
/// Pure function of the table contents. Fails only when no region column
/// can be found, or when a generic dataset has nothing numeric to count.
pub fn normalize(raw: &RawTable) -> Result<NormalizedTable> {
    let mut table = trim_cells(raw);

    let area_col = resolve_area_column(&mut table)?;
    let year_col = table.column_index(YEAR);
    let years: Vec<Option<i32>> = (0..table.rows.len())
        .map(|row| year_col.and_then(|c| parse_year_safe(cell_text(table.cell(row, c)).as_deref())))
        .collect();

    let numeric = numeric_columns(&table, year_col);
    let schema = DatasetSchema::detect(&table, &numeric)?;
    let base_column = table.headers[schema.base_column()].clone();
    log::info!(
        "{}: {:?} dataset, counting `{}` over {} rows",
        table.source,
        schema.kind(),
        base_column,
        table.rows.len()
    );

    let group_col = table.column_index(GROUP_NAME);
    let sub_group_col = table.column_index(SUB_GROUP_NAME);
    let label = |row: usize, col: Option<usize>| {
        col.and_then(|c| cell_text(table.cell(row, c)))
            .unwrap_or_else(|| OVERALL.to_string())
    };

    let records = (0..table.rows.len())
        .map(|row| {
            let area = cell_text(table.cell(row, area_col)).unwrap_or_default();
            let m = schema.measures(&table, row);
            NormalizedRecord {
                area_name: canonical_area(&area).to_string(),
                year: years[row],
                group_name: label(row, group_col),
                sub_group_name: label(row, sub_group_col),
                total_crimes: m.total_crimes,
                total_recovered: m.total_recovered,
                loss_value: m.loss_value,
                recovery_rate: m.recovery_rate,
            }
        })
        .collect();

    Ok(NormalizedTable {
        source: table.source.clone(),
        kind: schema.kind(),
        base_column,
        records,
    })
}

fn trim_cells(raw: &RawTable) -> RawTable {
    let rows = raw
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Cell::Text(s) if s.trim().is_empty() => Cell::Empty,
                    Cell::Text(s) => Cell::Text(s.trim().to_string()),
                    other => other.clone(),
                })
                .collect()
        })
        .collect();
    RawTable {
        source: raw.source.clone(),
        headers: raw.headers.iter().map(|h| h.trim().to_string()).collect(),
        rows,
    }
}

/// Rename the first region alias to `Area_Name` when the canonical column
/// is absent, and return its index.
fn resolve_area_column(table: &mut RawTable) -> Result<usize> {
    if let Some(i) = table.column_index(AREA_NAME) {
        return Ok(i);
    }
    for alias in REGION_ALIASES {
        if let Some(i) = table.column_index(alias) {
            log::debug!("{}: using `{}` as {}", table.source, alias, AREA_NAME);
            table.headers[i] = AREA_NAME.to_string();
            return Ok(i);
        }
    }
    Err(DashboardError::MissingRegionColumn {
        source_name: table.source.clone(),
    })
}

/// A column is numeric when every non-empty cell parses. Categorical
/// columns are never numeric; `Year` always is once present.
fn numeric_columns(table: &RawTable, year_col: Option<usize>) -> Vec<bool> {
    table
        .headers
        .iter()
        .enumerate()
        .map(|(c, name)| {
            if CATEGORICAL.contains(&name.as_str()) {
                return false;
            }
            if Some(c) == year_col {
                return true;
            }
            table.rows.iter().all(|row| match row.get(c).unwrap_or(&Cell::Empty) {
                Cell::Empty => true,
                cell => cell_number(cell).is_some(),
            })
        })
        .collect()
}

fn cell_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Empty => None,
        Cell::Text(s) => Some(s.clone()),
        Cell::Number(v) => Some(v.to_string()),
    }
}
