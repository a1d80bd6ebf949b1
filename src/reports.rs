use crate::regions::RegionCatalog;
use crate::types::{
    Aggregation, Filters, Kpis, NormalizedRecord, NormalizedTable, StateSummaryRow, SubgroupRow,
    YearTrend, YearTrendRow,
};
use crate::util::recovery_rate;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

/// Category selector value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";
/// Drill-down selector value meaning "every region".
pub const ALL_REGIONS: &str = "All India";

pub const SUBGROUP_LIMIT: usize = 15;
pub const TOP_STATES_LIMIT: usize = 10;
pub const TOP_RECOVERY_LIMIT: usize = 15;

#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    crimes: f64,
    recovered: f64,
    loss: f64,
}

impl Totals {
    fn add(&mut self, r: &NormalizedRecord) {
        self.crimes += r.total_crimes;
        self.recovered += r.total_recovered;
        self.loss += r.loss_value;
    }
}

/// Sum rows per key, keeping keys in first-seen order.
fn group_totals<'a, K, F>(rows: &[&'a NormalizedRecord], key: F) -> Vec<(K, Totals)>
where
    K: Eq + Hash + Clone,
    F: Fn(&'a NormalizedRecord) -> Option<K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Totals)> = Vec::new();
    for &r in rows {
        let Some(k) = key(r) else { continue };
        let slot = *index.entry(k.clone()).or_insert_with(|| {
            groups.push((k, Totals::default()));
            groups.len() - 1
        });
        groups[slot].1.add(r);
    }
    groups
}

/// Apply the year-range and category predicates.
///
/// The year range only applies when the dataset has any year data; once it
/// applies, rows without a year are dropped.
pub fn filter_rows<'a>(table: &'a NormalizedTable, filters: &Filters) -> Vec<&'a NormalizedRecord> {
    let year_range = filters.year_range.filter(|_| table.has_year_data());
    let category = filters
        .category
        .as_deref()
        .filter(|c| *c != ALL_CATEGORIES);

    table
        .records
        .iter()
        .filter(|r| match year_range {
            Some((lo, hi)) => r.year.is_some_and(|y| lo <= y && y <= hi),
            None => true,
        })
        .filter(|r| category.map_or(true, |c| r.group_name == c))
        .collect()
}

/// Per-region totals, one row per catalog region in catalog order. Regions
/// with no rows get zeros; rows for regions outside the catalog are left out.
pub fn state_summary(rows: &[&NormalizedRecord], catalog: &RegionCatalog) -> Vec<StateSummaryRow> {
    let groups: HashMap<String, Totals> =
        group_totals(rows, |r| Some(r.area_name.clone())).into_iter().collect();

    let unmatched: Vec<&String> = groups.keys().filter(|k| !catalog.contains(k)).collect();
    if !unmatched.is_empty() {
        log::warn!(
            "{} region(s) not in the boundary catalog: {:?}",
            unmatched.len(),
            unmatched
        );
    }

    catalog
        .names()
        .iter()
        .map(|name| {
            let t = groups.get(name).copied().unwrap_or_default();
            StateSummaryRow {
                area_name: name.clone(),
                total_crimes: t.crimes,
                total_recovered: t.recovered,
                loss_value: t.loss,
                recovery_rate: recovery_rate(t.recovered, t.crimes),
            }
        })
        .collect()
}

fn in_region<'a>(rows: &[&'a NormalizedRecord], region: Option<&str>) -> Vec<&'a NormalizedRecord> {
    match region.filter(|r| *r != ALL_REGIONS) {
        Some(region) => rows.iter().copied().filter(|r| r.area_name == region).collect(),
        None => rows.to_vec(),
    }
}

/// Top sub-groups by crime count, largest first. Ties keep first-seen order.
pub fn subgroup_summary(rows: &[&NormalizedRecord], region: Option<&str>) -> Vec<SubgroupRow> {
    let scoped = in_region(rows, region);
    let mut groups = group_totals(&scoped, |r| Some(r.sub_group_name.clone()));
    groups.sort_by(|a, b| b.1.crimes.partial_cmp(&a.1.crimes).unwrap_or(Ordering::Equal));
    groups
        .into_iter()
        .take(SUBGROUP_LIMIT)
        .map(|(sub_group_name, t)| SubgroupRow {
            sub_group_name,
            total_crimes: t.crimes,
        })
        .collect()
}

pub fn year_trend(rows: &[&NormalizedRecord], region: Option<&str>) -> YearTrend {
    let scoped = in_region(rows, region);
    let mut groups = group_totals(&scoped, |r| r.year);
    if groups.is_empty() {
        return YearTrend::Unavailable;
    }
    groups.sort_by_key(|(year, _)| *year);
    YearTrend::Available(
        groups
            .into_iter()
            .map(|(year, t)| YearTrendRow {
                year,
                total_crimes: t.crimes,
            })
            .collect(),
    )
}

pub fn kpis(summary: &[StateSummaryRow]) -> Kpis {
    let total_crimes: f64 = summary.iter().map(|r| r.total_crimes).sum();
    let total_recovered: f64 = summary.iter().map(|r| r.total_recovered).sum();
    Kpis {
        total_crimes,
        total_recovered,
        recovery_rate_pct: recovery_rate(total_recovered, total_crimes) * 100.0,
    }
}

/// Run every view for the current selection.
pub fn aggregate(table: &NormalizedTable, filters: &Filters, catalog: &RegionCatalog) -> Aggregation {
    let rows = filter_rows(table, filters);
    let region = filters.drilldown_region.as_deref();
    let state_summary = state_summary(&rows, catalog);
    let kpis = kpis(&state_summary);
    Aggregation {
        subgroup_summary: subgroup_summary(&rows, region),
        year_trend: year_trend(&rows, region),
        state_summary,
        kpis,
    }
}

fn top_by<F>(summary: &[StateSummaryRow], n: usize, metric: F) -> Vec<StateSummaryRow>
where
    F: Fn(&StateSummaryRow) -> f64,
{
    let mut rows = summary.to_vec();
    rows.sort_by(|a, b| metric(b).partial_cmp(&metric(a)).unwrap_or(Ordering::Equal));
    rows.truncate(n);
    rows
}

/// Highest crime counts first.
pub fn top_states(summary: &[StateSummaryRow], n: usize) -> Vec<StateSummaryRow> {
    top_by(summary, n, |r| r.total_crimes)
}

pub fn top_recovery(summary: &[StateSummaryRow], n: usize) -> Vec<StateSummaryRow> {
    top_by(summary, n, |r| r.recovery_rate)
}

// ── Selector options ────────────────────────────────────────────────────────

pub fn available_years(table: &NormalizedTable) -> Vec<i32> {
    let years: BTreeSet<i32> = table.records.iter().filter_map(|r| r.year).collect();
    years.into_iter().collect()
}

pub fn year_bounds(table: &NormalizedTable) -> Option<(i32, i32)> {
    let years = available_years(table);
    Some((*years.first()?, *years.last()?))
}

/// Order the endpoints and clamp them to what the data covers.
pub fn clamp_year_range(range: (i32, i32), bounds: (i32, i32)) -> (i32, i32) {
    let (lo, hi) = if range.0 <= range.1 { range } else { (range.1, range.0) };
    (lo.clamp(bounds.0, bounds.1), hi.clamp(bounds.0, bounds.1))
}

/// Categories present after the year filter, behind the "All" sentinel.
pub fn group_options(table: &NormalizedTable, year_range: Option<(i32, i32)>) -> Vec<String> {
    let filters = Filters {
        year_range,
        ..Filters::default()
    };
    let groups: BTreeSet<&str> = filter_rows(table, &filters)
        .into_iter()
        .map(|r| r.group_name.as_str())
        .collect();
    std::iter::once(ALL_CATEGORIES.to_string())
        .chain(groups.into_iter().map(str::to_string))
        .collect()
}

pub fn region_options(catalog: &RegionCatalog) -> Vec<String> {
    std::iter::once(ALL_REGIONS.to_string())
        .chain(catalog.names().iter().cloned())
        .collect()
}
