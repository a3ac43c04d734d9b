//! Top-level error type

use thiserror::Error;

use crate::config::ConfigError;
use crate::data::DataError;
use crate::loader::LoadError;
use crate::theme::ThemeError;

/// Errors that can occur anywhere between startup and writing the map
#[derive(Debug, Error)]
pub enum MapError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The dataset could not be fetched; nothing was rendered
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("theme error: {0}")]
    Theme(#[from] ThemeError),

    #[error("failed to serialize GeoJSON: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err: MapError = ConfigError::Missing {
            name: "MAPBOX_API_KEY",
            message: "Missing Mapbox API key!",
        }
        .into();
        assert_eq!(
            err.to_string(),
            "configuration error: Missing Mapbox API key! (set MAPBOX_API_KEY)"
        );
    }

    #[test]
    fn test_load_error_display() {
        let err: MapError = LoadError::Status {
            url: "https://x.test/f".to_string(),
            status: 401,
        }
        .into();
        assert!(err.to_string().contains("HTTP 401"));
        assert!(matches!(err, MapError::Load(_)));
    }
}
