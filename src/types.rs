use serde::Serialize;
use tabled::Tabled;

/// One cell of a dataset as read from disk, before any coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

/// A dataset whose schema is not known in advance.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// File name or label, used in error messages.
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&Cell::Empty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub area_name: String,
    pub year: Option<i32>,
    pub group_name: String,
    pub sub_group_name: String,
    pub total_crimes: f64,
    pub total_recovered: f64,
    pub loss_value: f64,
    pub recovery_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DatasetKind {
    PropertyCrime,
    Generic,
    /// Already carries the canonical measure columns.
    Canonical,
}

/// Output of the normalizer: uniform records plus what was learned about
/// the source schema.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub source: String,
    pub kind: DatasetKind,
    /// Column the crime count was read from.
    pub base_column: String,
    pub records: Vec<NormalizedRecord>,
}

impl NormalizedTable {
    pub fn has_year_data(&self) -> bool {
        self.records.iter().any(|r| r.year.is_some())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Filters {
    pub year_range: Option<(i32, i32)>,
    pub category: Option<String>,
    pub drilldown_region: Option<String>,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct StateSummaryRow {
    #[serde(rename = "Area_Name")]
    #[tabled(rename = "Area_Name")]
    pub area_name: String,
    #[serde(rename = "Total_Crimes")]
    #[tabled(rename = "Total_Crimes")]
    pub total_crimes: f64,
    #[serde(rename = "Total_Recovered")]
    #[tabled(rename = "Total_Recovered")]
    pub total_recovered: f64,
    #[serde(rename = "Loss_Value")]
    #[tabled(rename = "Loss_Value")]
    pub loss_value: f64,
    #[serde(rename = "Recovery_Rate")]
    #[tabled(rename = "Recovery_Rate")]
    pub recovery_rate: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct SubgroupRow {
    #[serde(rename = "Sub_Group_Name")]
    #[tabled(rename = "Sub_Group_Name")]
    pub sub_group_name: String,
    #[serde(rename = "Total_Crimes")]
    #[tabled(rename = "Total_Crimes")]
    pub total_crimes: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct YearTrendRow {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Total_Crimes")]
    #[tabled(rename = "Total_Crimes")]
    pub total_crimes: f64,
}

/// "No year dimension" is a different answer from "zero crimes in range".
#[derive(Debug, Clone, PartialEq)]
pub enum YearTrend {
    Available(Vec<YearTrendRow>),
    Unavailable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Kpis {
    pub total_crimes: f64,
    pub total_recovered: f64,
    /// Percentage, 0..=100 for well-formed data.
    pub recovery_rate_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub state_summary: Vec<StateSummaryRow>,
    pub subgroup_summary: Vec<SubgroupRow>,
    pub year_trend: YearTrend,
    pub kpis: Kpis,
}

#[derive(Debug, Serialize)]
pub struct SummaryFile<'a> {
    pub dataset: &'a str,
    pub kind: DatasetKind,
    pub base_column: &'a str,
    pub filters: &'a Filters,
    pub kpis: Kpis,
    pub regions: usize,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}
