//! Model file loading (YAML or JSON).

use crate::Model;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Serialization format of a model file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelFormat {
    Yaml,
    Json,
}

impl ModelFormat {
    /// Pick a format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(ModelFormat::Yaml),
            "json" => Some(ModelFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported model file extension: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("invalid YAML model: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON model: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a model from text in the given format.
pub fn parse_model(text: &str, format: ModelFormat) -> Result<Model, ConfigError> {
    let model = match format {
        ModelFormat::Yaml => serde_yaml::from_str(text)?,
        ModelFormat::Json => serde_json::from_str(text)?,
    };
    Ok(model)
}

/// Load a model file, choosing the parser from its extension.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Model, ConfigError> {
    let path = path.as_ref();
    let format = ModelFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let model = parse_model(&text, format)?;
    debug!(
        path = %path.display(),
        tiers = model.tiers.len(),
        scenarios = model.scenarios.len(),
        "loaded model"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TierRole;

    fn assets() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets")
    }

    #[test]
    fn shipped_model_matches_default() {
        let model = load_model(assets().join("default_model.yaml")).unwrap();
        assert_eq!(model, Model::default());
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            ModelFormat::from_path(Path::new("a/model.YML")),
            Some(ModelFormat::Yaml)
        );
        assert_eq!(
            ModelFormat::from_path(Path::new("model.json")),
            Some(ModelFormat::Json)
        );
        assert_eq!(ModelFormat::from_path(Path::new("model.toml")), None);
        assert_eq!(ModelFormat::from_path(Path::new("model")), None);
    }

    #[test]
    fn unsupported_and_missing_files() {
        assert!(matches!(
            load_model("model.toml"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            load_model(assets().join("does_not_exist.yaml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn yaml_with_roles_and_defaults() {
        let text = r#"
start_month: 2025-03-01
bulk_products:
  - id: bag
    name: Bag
    servings_per_unit: 180
    wholesale_price: 80
    cogs: 12.93
tiers:
  - id: big
    label: Big Cafe
    role: large
    bulk_product_ids: [bag]
    drinks_per_day: 50
    units_per_serving: 1
    days_per_month: 30
scenarios:
  - name: Only
    starting_partners: 2
    new_partners_per_month: 1
    pct_small: 0
    pct_medium: 0
    pct_large: 100
    monthly_churn_pct: 0
    retail_attach_pct: 0
"#;
        let model = parse_model(text, ModelFormat::Yaml).unwrap();
        assert_eq!(model.tiers[0].role, Some(TierRole::Large));
        assert!(model.retail_products.is_empty());
        assert!(model.tiers[0].retail_product_ids.is_empty());
        assert_eq!(model.tiers[0].retail_units_per_month, 0.0);
        assert_eq!(model.bulk_products[0].size_units, "");
        assert_eq!(model.scenarios[0].color, "");
        assert_eq!(
            model.start_month,
            chrono::NaiveDate::from_ymd_opt(2025, 3, 1)
        );
    }

    #[test]
    fn json_parse_error_is_reported() {
        let err = parse_model("{\"tiers\": 3}", ModelFormat::Json).unwrap_err();
        assert!(err.to_string().starts_with("invalid JSON model"));
    }
}
