use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

/// Coarse classification used by the front end to decide whether a failure
/// blocks everything, blocks one dataset, or just asks for another choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Schema,
    MissingFile,
    Io,
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("{} not found. Place the boundary file next to the datasets", path.display())]
    MissingBoundary { path: PathBuf },

    #[error("Invalid boundary file {}: {message}", path.display())]
    InvalidBoundary { path: PathBuf, message: String },

    #[error("Invalid config {}: {message}", path.display())]
    InvalidConfig { path: PathBuf, message: String },

    #[error("No region column found in dataset: {source_name}")]
    MissingRegionColumn { source_name: String },

    #[error("No numeric columns found in dataset: {source_name}")]
    NoNumericColumns { source_name: String },

    #[error("Dataset file not found for {label}: {}", path.display())]
    MissingFile { label: String, path: PathBuf },

    #[error("Unknown dataset: {label}")]
    UnknownDataset { label: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl DashboardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingBoundary { .. }
            | Self::InvalidBoundary { .. }
            | Self::InvalidConfig { .. }
            | Self::GeoJson(_)
            | Self::Toml(_) => ErrorKind::Config,
            Self::MissingRegionColumn { .. } | Self::NoNumericColumns { .. } | Self::Csv(_) => {
                ErrorKind::Schema
            }
            Self::MissingFile { .. } | Self::UnknownDataset { .. } => ErrorKind::MissingFile,
            Self::Io(_) | Self::Json(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_schema_failures() {
        let err = DashboardError::NoNumericColumns {
            source_name: "frauds_cleaned.csv".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert_eq!(
            err.to_string(),
            "No numeric columns found in dataset: frauds_cleaned.csv"
        );
    }

    #[test]
    fn missing_dataset_is_recoverable_kind() {
        let err = DashboardError::MissingFile {
            label: "Murders".to_string(),
            path: PathBuf::from("murder_cleaned.csv"),
        };
        assert_eq!(err.kind(), ErrorKind::MissingFile);
        assert!(err.to_string().contains("murder_cleaned.csv"));
    }

    #[test]
    fn missing_boundary_names_the_file() {
        let err = DashboardError::MissingBoundary {
            path: PathBuf::from("india_state.geojson"),
        };
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().starts_with("india_state.geojson not found"));
    }
}
