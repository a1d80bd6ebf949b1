//! Column names and per-kind derivation rules for crime datasets.
use crate::error::{DashboardError, Result};
use crate::types::{Cell, DatasetKind, RawTable};
use crate::util::{non_negative, parse_f64_safe, recovery_rate};
use once_cell::sync::Lazy;
use std::collections::HashMap;

// ── Canonical columns ───────────────────────────────────────────────────────
pub const AREA_NAME: &str = "Area_Name";
pub const YEAR: &str = "Year";
pub const GROUP_NAME: &str = "Group_Name";
pub const SUB_GROUP_NAME: &str = "Sub_Group_Name";
pub const TOTAL_CRIMES: &str = "Total_Crimes";
pub const TOTAL_RECOVERED: &str = "Total_Recovered";
pub const LOSS_VALUE: &str = "Loss_Value";
pub const RECOVERY_RATE: &str = "Recovery_Rate";

/// Never coerced to numbers.
pub const CATEGORICAL: [&str; 3] = [AREA_NAME, GROUP_NAME, SUB_GROUP_NAME];

pub const OVERALL: &str = "Overall";

// ── Property crime columns ──────────────────────────────────────────────────
pub mod property {
    pub const CASES_STOLEN: &str = "Cases_Property_Stolen";
    pub const CASES_RECOVERED: &str = "Cases_Property_Recovered";
    pub const VALUE_STOLEN: &str = "Value_of_Property_Stolen";
    pub const VALUE_RECOVERED: &str = "Value_of_Property_Recovered";
}

/// Tried in order when a dataset has no `Area_Name` column.
pub const REGION_ALIASES: [&str; 6] = [
    "STATE/UT", "State/UT", "State", "STATE", "District", "DISTRICT",
];

/// Substrings (lowercase) that mark a column as a likely crime count.
pub const BASE_COLUMN_HINTS: [&str; 3] = ["case", "crime", "total"];

/// Historical and alternate spellings mapped to the names used by the
/// boundary file.
pub static STATE_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("NCT of Delhi", "Delhi"),
        ("Orissa", "Odisha"),
        ("Uttaranchal", "Uttarakhand"),
        ("Jammu & Kashmir", "Jammu and Kashmir"),
        ("Andaman & Nicobar Islands", "Andaman and Nicobar"),
        ("Dadra & Nagar Haveli", "Dadra and Nagar Haveli"),
        ("Daman & Diu", "Daman and Diu"),
    ])
});

pub fn canonical_area(name: &str) -> &str {
    STATE_ALIASES.get(name).copied().unwrap_or(name)
}

pub fn cell_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(v) => Some(*v),
        Cell::Text(s) => parse_f64_safe(Some(s.as_str())),
        Cell::Empty => None,
    }
}

/// Measures derived from one source row.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measures {
    pub total_crimes: f64,
    pub total_recovered: f64,
    pub loss_value: f64,
    pub recovery_rate: f64,
}

/// How `Total_Crimes` and friends are derived, decided once per dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetSchema {
    PropertyCrime {
        cases_stolen: usize,
        cases_recovered: Option<usize>,
        value_stolen: Option<usize>,
        value_recovered: Option<usize>,
    },
    Generic {
        base_column: usize,
    },
    /// Output of an earlier normalization: measures are read back as-is.
    Canonical {
        total_crimes: usize,
        total_recovered: usize,
        loss_value: usize,
    },
}

impl DatasetSchema {
    /// Pick the schema for `table`. `numeric` flags which columns coerced
    /// cleanly to numbers.
    pub fn detect(table: &RawTable, numeric: &[bool]) -> Result<Self> {
        if let Some(cases_stolen) = table.column_index(property::CASES_STOLEN) {
            return Ok(DatasetSchema::PropertyCrime {
                cases_stolen,
                cases_recovered: table.column_index(property::CASES_RECOVERED),
                value_stolen: table.column_index(property::VALUE_STOLEN),
                value_recovered: table.column_index(property::VALUE_RECOVERED),
            });
        }
        if let (Some(total_crimes), Some(total_recovered), Some(loss_value)) = (
            table.column_index(TOTAL_CRIMES),
            table.column_index(TOTAL_RECOVERED),
            table.column_index(LOSS_VALUE),
        ) {
            return Ok(DatasetSchema::Canonical {
                total_crimes,
                total_recovered,
                loss_value,
            });
        }

        let numeric_cols: Vec<usize> = numeric
            .iter()
            .enumerate()
            .filter(|(_, is_num)| **is_num)
            .map(|(i, _)| i)
            .collect();
        let Some(&first) = numeric_cols.first() else {
            return Err(DashboardError::NoNumericColumns {
                source_name: table.source.clone(),
            });
        };
        let preferred = numeric_cols.iter().copied().find(|&i| {
            let name = table.headers[i].to_lowercase();
            BASE_COLUMN_HINTS.iter().any(|hint| name.contains(hint))
        });
        Ok(DatasetSchema::Generic {
            base_column: preferred.unwrap_or(first),
        })
    }

    pub fn kind(&self) -> DatasetKind {
        match self {
            DatasetSchema::PropertyCrime { .. } => DatasetKind::PropertyCrime,
            DatasetSchema::Generic { .. } => DatasetKind::Generic,
            DatasetSchema::Canonical { .. } => DatasetKind::Canonical,
        }
    }

    pub fn base_column(&self) -> usize {
        match self {
            DatasetSchema::PropertyCrime { cases_stolen, .. } => *cases_stolen,
            DatasetSchema::Generic { base_column } => *base_column,
            DatasetSchema::Canonical { total_crimes, .. } => *total_crimes,
        }
    }

    pub fn measures(&self, table: &RawTable, row: usize) -> Measures {
        let number = |col: Option<usize>| {
            col.and_then(|c| cell_number(table.cell(row, c)))
                .unwrap_or(0.0)
        };
        match self {
            DatasetSchema::PropertyCrime {
                cases_stolen,
                cases_recovered,
                value_stolen,
                value_recovered,
            } => {
                let total_crimes = non_negative(number(Some(*cases_stolen)));
                let total_recovered = non_negative(number(*cases_recovered));
                Measures {
                    total_crimes,
                    total_recovered,
                    loss_value: number(*value_stolen) - number(*value_recovered),
                    recovery_rate: recovery_rate(total_recovered, total_crimes),
                }
            }
            DatasetSchema::Generic { base_column } => Measures {
                total_crimes: non_negative(number(Some(*base_column))),
                ..Measures::default()
            },
            DatasetSchema::Canonical {
                total_crimes,
                total_recovered,
                loss_value,
            } => {
                let total_crimes = non_negative(number(Some(*total_crimes)));
                let total_recovered = non_negative(number(Some(*total_recovered)));
                Measures {
                    total_crimes,
                    total_recovered,
                    loss_value: number(Some(*loss_value)),
                    recovery_rate: recovery_rate(total_recovered, total_crimes),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: Vec<Vec<Cell>>) -> RawTable {
        RawTable {
            source: "fixture.csv".to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn canonicalizes_known_aliases_only() {
        assert_eq!(canonical_area("Orissa"), "Odisha");
        assert_eq!(canonical_area("NCT of Delhi"), "Delhi");
        assert_eq!(canonical_area("Kerala"), "Kerala");
        assert_eq!(STATE_ALIASES.len(), 7);
    }

    #[test]
    fn prefers_hinted_column_over_first_numeric() {
        let t = table(&["Area_Name", "Year", "Victims", "Total_Cases"], vec![]);
        let schema = DatasetSchema::detect(&t, &[false, true, true, true]).unwrap();
        assert_eq!(schema, DatasetSchema::Generic { base_column: 3 });
    }

    #[test]
    fn hint_match_is_case_insensitive() {
        let t = table(&["Area_Name", "Victims", "CRIME_COUNT"], vec![]);
        let schema = DatasetSchema::detect(&t, &[false, true, true]).unwrap();
        assert_eq!(schema.base_column(), 2);
    }

    #[test]
    fn property_measures_default_missing_columns() {
        let t = table(
            &["Area_Name", "Cases_Property_Stolen", "Value_of_Property_Stolen"],
            vec![vec![
                Cell::Text("Goa".to_string()),
                Cell::Text("40".to_string()),
                Cell::Text("1000".to_string()),
            ]],
        );
        let schema = DatasetSchema::detect(&t, &[false, true, true]).unwrap();
        assert_eq!(schema.kind(), DatasetKind::PropertyCrime);
        let m = schema.measures(&t, 0);
        assert_eq!(m.total_crimes, 40.0);
        assert_eq!(m.total_recovered, 0.0);
        assert_eq!(m.loss_value, 1000.0);
        assert_eq!(m.recovery_rate, 0.0);
    }

    #[test]
    fn canonical_columns_are_read_back() {
        let t = table(
            &["Area_Name", "Total_Crimes", "Total_Recovered", "Loss_Value", "Recovery_Rate"],
            vec![vec![
                Cell::Text("Goa".to_string()),
                Cell::Number(40.0),
                Cell::Number(10.0),
                Cell::Number(3500.0),
                Cell::Number(0.9),
            ]],
        );
        let schema = DatasetSchema::detect(&t, &[false, true, true, true, true]).unwrap();
        assert_eq!(schema.kind(), DatasetKind::Canonical);
        assert_eq!(schema.base_column(), 1);
        let m = schema.measures(&t, 0);
        assert_eq!(m.total_recovered, 10.0);
        assert_eq!(m.loss_value, 3500.0);
        assert_eq!(m.recovery_rate, 0.25);
    }

    #[test]
    fn property_rate_is_capped_and_negative_counts_zeroed() {
        let t = table(
            &["Area_Name", "Cases_Property_Stolen", "Cases_Property_Recovered"],
            vec![
                vec![
                    Cell::Text("Goa".to_string()),
                    Cell::Text("4".to_string()),
                    Cell::Text("10".to_string()),
                ],
                vec![
                    Cell::Text("Kerala".to_string()),
                    Cell::Text("-3".to_string()),
                    Cell::Text("0".to_string()),
                ],
            ],
        );
        let schema = DatasetSchema::detect(&t, &[false, true, true]).unwrap();
        assert_eq!(schema.measures(&t, 0).recovery_rate, 1.0);
        let kerala = schema.measures(&t, 1);
        assert_eq!(kerala.total_crimes, 0.0);
        assert_eq!(kerala.recovery_rate, 0.0);
    }
}
