use crate::error::{DashboardError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatasetEntry {
    pub label: String,
    pub file: String,
}

/// Built once at startup and passed down; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub boundary_file: String,
    /// Feature property holding the region name.
    pub region_key: String,
    pub output_dir: PathBuf,
    pub datasets: Vec<DatasetEntry>,
}

const DEFAULT_DATASETS: [(&str, &str); 8] = [
    ("Property Crime", "property_crime_cleaned.csv"),
    ("Murders", "murder_cleaned.csv"),
    ("Kidnapping & Abduction", "kidnapping_cleaned.csv"),
    ("Crime Against Women", "women_crimes_cleaned.csv"),
    ("Frauds", "frauds_cleaned.csv"),
    ("Auto Theft", "auto_theft_cleaned.csv"),
    ("Complaint against police", "police_complaints_cleaned.csv"),
    ("Trial of violent crimes", "trials_cleaned.csv"),
];

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_dir: PathBuf::from("."),
            boundary_file: "india_state.geojson".to_string(),
            region_key: "NAME_1".to_string(),
            output_dir: PathBuf::from("."),
            datasets: DEFAULT_DATASETS
                .iter()
                .map(|(label, file)| DatasetEntry {
                    label: label.to_string(),
                    file: file.to_string(),
                })
                .collect(),
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(path: &Path, content: &str) -> Result<Self> {
        let config: DashboardConfig = toml::from_str(content)?;
        if config.datasets.is_empty() {
            return Err(DashboardError::InvalidConfig {
                path: path.to_path_buf(),
                message: "no datasets configured".to_string(),
            });
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(path, &content)
    }

    pub fn boundary_path(&self) -> PathBuf {
        self.data_dir.join(&self.boundary_file)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.datasets.iter().map(|d| d.label.as_str())
    }

    /// Path of the dataset behind `label`. Does not check that it exists.
    pub fn dataset_path(&self, label: &str) -> Result<PathBuf> {
        self.datasets
            .iter()
            .find(|d| d.label == label)
            .map(|d| self.data_dir.join(&d.file))
            .ok_or_else(|| DashboardError::UnknownDataset {
                label: label.to_string(),
            })
    }
}
