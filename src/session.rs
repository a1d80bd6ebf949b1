use crate::cache::{CacheKey, MemoCache};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::loader::load_table;
use crate::normalize::normalize;
use crate::regions::{build_catalog, load_boundary, RegionCatalog};
use crate::types::NormalizedTable;
use geojson::FeatureCollection;
use std::rc::Rc;

/// Boundary document plus the catalog derived from it.
#[derive(Debug)]
pub struct Boundary {
    pub features: FeatureCollection,
    pub catalog: RegionCatalog,
}

/// Everything that survives between interactions: the configuration, the
/// boundary data, and every dataset normalized so far.
pub struct Session {
    config: DashboardConfig,
    boundaries: MemoCache<Boundary>,
    tables: MemoCache<NormalizedTable>,
}

impl Session {
    pub fn new(config: DashboardConfig) -> Self {
        Session {
            config,
            boundaries: MemoCache::default(),
            tables: MemoCache::default(),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn boundary(&mut self) -> Result<Rc<Boundary>> {
        let path = self.config.boundary_path();
        let region_key = self.config.region_key.as_str();
        let key = CacheKey::new("load_boundary", path.display().to_string());
        self.boundaries.get_or_try_insert_with(key, || {
            let features = load_boundary(&path)?;
            let catalog = build_catalog(&features, region_key);
            Ok(Boundary { features, catalog })
        })
    }

    /// Normalized contents of the dataset behind `label`, loaded on first use.
    pub fn dataset(&mut self, label: &str) -> Result<Rc<NormalizedTable>> {
        let path = self.config.dataset_path(label)?;
        if !path.is_file() {
            log::warn!("dataset file missing for {}: {}", label, path.display());
            return Err(DashboardError::MissingFile {
                label: label.to_string(),
                path,
            });
        }
        let key = CacheKey::new("normalize", path.display().to_string());
        let table = self.tables.get_or_try_insert_with(key, || {
            let raw = load_table(&path)?;
            normalize(&raw)
        })?;
        log::debug!("{} dataset(s) normalized this session", self.tables.len());
        Ok(table)
    }

    pub fn dataset_available(&self, label: &str) -> bool {
        self.config
            .dataset_path(label)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatasetEntry;
    use crate::error::ErrorKind;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("crime_dashboard_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config(dir: &PathBuf) -> DashboardConfig {
        DashboardConfig {
            data_dir: dir.clone(),
            output_dir: dir.clone(),
            datasets: vec![
                DatasetEntry { label: "Murders".to_string(), file: "murder.csv".to_string() },
                DatasetEntry { label: "Frauds".to_string(), file: "frauds.csv".to_string() },
                DatasetEntry { label: "Trials".to_string(), file: "trials.csv".to_string() },
            ],
            ..DashboardConfig::default()
        }
    }

    #[test]
    fn dataset_is_normalized_once() {
        let dir = scratch_dir("session_cache");
        std::fs::write(dir.join("murder.csv"), "State,Year,Murders\nOrissa,2010,4\n").unwrap();
        let mut session = Session::new(config(&dir));

        let a = session.dataset("Murders").unwrap();
        let b = session.dataset("Murders").unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(a.records[0].area_name, "Odisha");
        assert!(session.dataset_available("Murders"));
        assert!(!session.dataset_available("Frauds"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_dataset_is_recoverable() {
        let dir = scratch_dir("session_missing");
        let mut session = Session::new(config(&dir));
        let err = session.dataset("Frauds").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingFile);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn schema_errors_surface_and_leave_other_datasets_usable() {
        let dir = scratch_dir("session_schema");
        std::fs::write(dir.join("trials.csv"), "Area_Name,Remarks\nGoa,pending\n").unwrap();
        std::fs::write(dir.join("murder.csv"), "Area_Name,Murders\nGoa,1\n").unwrap();
        let mut session = Session::new(config(&dir));
        assert_eq!(session.dataset("Trials").unwrap_err().kind(), ErrorKind::Schema);
        assert!(session.dataset("Murders").is_ok());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn boundary_is_loaded_once_and_cataloged() {
        let dir = scratch_dir("session_boundary");
        std::fs::write(
            dir.join("india_state.geojson"),
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"NAME_1":"Goa"},"geometry":null}
            ]}"#,
        )
        .unwrap();
        let mut session = Session::new(config(&dir));
        let a = session.boundary().unwrap();
        let b = session.boundary().unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(a.catalog.names(), ["Goa".to_string()]);
        std::fs::remove_dir_all(&dir).ok();
    }
}
