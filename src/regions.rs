use crate::error::{DashboardError, Result};
use geojson::{FeatureCollection, GeoJson};
use std::collections::BTreeSet;
use std::path::Path;

/// Every region the map knows about, sorted and de-duplicated. State
/// summaries always carry exactly one row per entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionCatalog {
    names: Vec<String>,
}

impl RegionCatalog {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        RegionCatalog {
            names: set.into_iter().collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.binary_search_by(|n| n.as_str().cmp(name)).is_ok()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Read the boundary document. A missing file is a configuration error.
pub fn load_boundary(path: &Path) -> Result<FeatureCollection> {
    if !path.exists() {
        return Err(DashboardError::MissingBoundary {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path)?;
    match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => Ok(fc),
        _ => Err(DashboardError::InvalidBoundary {
            path: path.to_path_buf(),
            message: "expected a FeatureCollection".to_string(),
        }),
    }
}

/// Collect the `region_key` property of every feature.
pub fn build_catalog(boundary: &FeatureCollection, region_key: &str) -> RegionCatalog {
    let mut names = Vec::with_capacity(boundary.features.len());
    for (idx, feature) in boundary.features.iter().enumerate() {
        match feature.property(region_key).and_then(|v| v.as_str()) {
            Some(name) => names.push(name.to_string()),
            None => log::warn!("boundary feature {} has no `{}` property", idx, region_key),
        }
    }
    let catalog = RegionCatalog::from_names(names);
    if catalog.is_empty() {
        log::warn!("no feature carries a `{}` property; every summary will be empty", region_key);
    }
    log::info!("region catalog: {} regions", catalog.len());
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"NAME_1": "Kerala"}, "geometry": null},
            {"type": "Feature", "properties": {"NAME_1": "Goa"}, "geometry": null},
            {"type": "Feature", "properties": {"NAME_1": "Kerala"}, "geometry": null},
            {"type": "Feature", "properties": {"OTHER": "x"}, "geometry": null}
        ]
    }"#;

    fn boundary() -> FeatureCollection {
        BOUNDARY.parse().unwrap()
    }

    #[test]
    fn catalog_is_sorted_and_deduplicated() {
        let catalog = build_catalog(&boundary(), "NAME_1");
        assert_eq!(catalog.names(), ["Goa".to_string(), "Kerala".to_string()]);
        assert!(catalog.contains("Kerala"));
        assert!(!catalog.contains("Bihar"));
    }

    #[test]
    fn unknown_property_key_yields_empty_catalog() {
        let catalog = build_catalog(&boundary(), "ST_NM");
        assert!(catalog.is_empty());
    }

    #[test]
    fn missing_boundary_file_is_config_error() {
        let path = std::env::temp_dir().join("crime_dashboard_missing_state.geojson");
        let err = load_boundary(&path).unwrap_err();
        assert!(matches!(err, DashboardError::MissingBoundary { .. }));
    }

    #[test]
    fn loads_boundary_from_disk() {
        let path = std::env::temp_dir().join(format!(
            "crime_dashboard_boundary_{}.geojson",
            std::process::id()
        ));
        std::fs::write(&path, BOUNDARY).unwrap();
        let fc = load_boundary(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(fc.features.len(), 4);
    }

    #[test]
    fn single_feature_document_is_rejected() {
        let path = std::env::temp_dir().join(format!(
            "crime_dashboard_feature_{}.geojson",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"{"type":"Feature","properties":{"NAME_1":"Goa"},"geometry":null}"#,
        )
        .unwrap();
        let err = load_boundary(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, DashboardError::InvalidBoundary { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }
}
