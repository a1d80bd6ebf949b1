use crate::error::Result;
use crate::schema::{LOSS_VALUE, RECOVERY_RATE, TOTAL_CRIMES, TOTAL_RECOVERED};
use crate::types::StateSummaryRow;
use geojson::{FeatureCollection, GeoJson};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn write_geojson(path: &Path, layer: FeatureCollection) -> Result<()> {
    std::fs::write(path, GeoJson::from(layer).to_string())?;
    Ok(())
}

/// Copy the boundary features and attach the summary metrics to each, so a
/// map renderer can shade regions without joining anything itself.
pub fn choropleth_layer(
    boundary: &FeatureCollection,
    summary: &[StateSummaryRow],
    region_key: &str,
) -> FeatureCollection {
    let by_name: HashMap<&str, &StateSummaryRow> =
        summary.iter().map(|r| (r.area_name.as_str(), r)).collect();
    let mut layer = boundary.clone();
    for feature in &mut layer.features {
        let name = feature
            .property(region_key)
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let Some(row) = name.as_deref().and_then(|n| by_name.get(n)) else {
            continue;
        };
        feature.set_property(TOTAL_CRIMES, row.total_crimes);
        feature.set_property(TOTAL_RECOVERED, row.total_recovered);
        feature.set_property(LOSS_VALUE, row.loss_value);
        feature.set_property(RECOVERY_RATE, row.recovery_rate);
    }
    layer
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("\n{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choropleth_layer_attaches_metrics() {
        let boundary: FeatureCollection = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"NAME_1":"Goa"},"geometry":null},
            {"type":"Feature","properties":{"NAME_1":"Atlantis"},"geometry":null}
        ]}"#
        .parse()
        .unwrap();
        let summary = vec![StateSummaryRow {
            area_name: "Goa".to_string(),
            total_crimes: 10.0,
            total_recovered: 4.0,
            loss_value: 250.0,
            recovery_rate: 0.4,
        }];
        let layer = choropleth_layer(&boundary, &summary, "NAME_1");
        let goa = &layer.features[0];
        assert_eq!(goa.property(TOTAL_CRIMES).and_then(|v| v.as_f64()), Some(10.0));
        assert_eq!(goa.property(RECOVERY_RATE).and_then(|v| v.as_f64()), Some(0.4));
        assert!(layer.features[1].property(TOTAL_CRIMES).is_none());
        assert!(boundary.features[0].property(TOTAL_CRIMES).is_none());
    }

    #[test]
    fn writes_state_summary_csv_with_canonical_headers() {
        let path = std::env::temp_dir().join(format!(
            "crime_dashboard_state_summary_{}.csv",
            std::process::id()
        ));
        let rows = vec![StateSummaryRow {
            area_name: "Goa".to_string(),
            total_crimes: 10.0,
            total_recovered: 5.0,
            loss_value: 0.0,
            recovery_rate: 0.5,
        }];
        write_csv(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Area_Name,Total_Crimes,Total_Recovered,Loss_Value,Recovery_Rate")
        );
        assert_eq!(lines.next(), Some("Goa,10.0,5.0,0.0,0.5"));
    }
}
