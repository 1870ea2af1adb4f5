use crate::error::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Rows printed by the explore step at each cleaning stage.
    pub sample_rows: usize,
    pub datasets: Vec<DatasetConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub label: String,
    pub path: String,
    pub name_column: usize,
    pub price_column: usize,
    /// Exact price string marking a free app, e.g. "0" or "0.0".
    pub free_price: String,
    #[serde(default)]
    pub frequency_columns: Vec<usize>,
    pub dedup: Option<DedupConfig>,
    #[serde(default)]
    pub averages: Vec<AverageConfig>,
    #[serde(default)]
    pub drilldowns: Vec<DrilldownConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DedupConfig {
    pub review_column: usize,
    #[serde(default)]
    pub ordering: ReviewOrdering,
}

/// How review counts are compared when picking the row to keep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewOrdering {
    #[default]
    #[serde(rename = "numeric")]
    Numeric,
    #[serde(rename = "lexicographic")]
    Lexicographic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageConfig {
    pub title: String,
    pub category_column: usize,
    pub value_column: usize,
    #[serde(default)]
    pub normalizer: ValueNormalizer,
}

/// Cleanup applied to a raw field before it is parsed as a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueNormalizer {
    #[default]
    #[serde(rename = "none")]
    None,
    /// "10,000,000+" -> "10000000"
    #[serde(rename = "installs")]
    Installs,
    /// "NaN" -> "0"
    #[serde(rename = "missing_as_zero")]
    MissingAsZero,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrilldownConfig {
    pub category_column: usize,
    pub category: String,
    pub value_column: usize,
    pub value_label: String,
    pub only_if: Option<ColumnMatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMatch {
    pub column: usize,
    pub equals: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rows: 3,
            datasets: vec![app_store_defaults(), google_play_defaults()],
        }
    }
}

fn app_store_defaults() -> DatasetConfig {
    let genre = 11;
    let ratings_count = 5;
    let user_rating = 8;
    let drilldown = |category: &str, value_column: usize| DrilldownConfig {
        category_column: genre,
        category: category.to_string(),
        value_column,
        value_label: "user ratings".to_string(),
        only_if: None,
    };

    DatasetConfig {
        label: "App Store".to_string(),
        path: "AppleStore.csv".to_string(),
        name_column: 1,
        price_column: 4,
        free_price: "0.0".to_string(),
        frequency_columns: vec![genre],
        dedup: None,
        averages: vec![
            AverageConfig {
                title: "Average number of user ratings per genre".to_string(),
                category_column: genre,
                value_column: ratings_count,
                normalizer: ValueNormalizer::None,
            },
            AverageConfig {
                title: "Average user rating per genre".to_string(),
                category_column: genre,
                value_column: user_rating,
                normalizer: ValueNormalizer::None,
            },
        ],
        drilldowns: vec![
            drilldown("Navigation", ratings_count),
            drilldown("Reference", ratings_count),
            drilldown("Games", ratings_count),
            drilldown("Reference", user_rating),
            drilldown("Productivity", user_rating),
            drilldown("Games", user_rating),
        ],
    }
}

fn google_play_defaults() -> DatasetConfig {
    let category = 1;
    let rating = 2;
    let installs = 5;

    DatasetConfig {
        label: "Google Play".to_string(),
        path: "googleplaystore.csv".to_string(),
        name_column: 0,
        price_column: 7,
        free_price: "0".to_string(),
        frequency_columns: vec![9, category],
        dedup: Some(DedupConfig {
            review_column: 3,
            ordering: ReviewOrdering::Numeric,
        }),
        averages: vec![
            AverageConfig {
                title: "Average installs per category".to_string(),
                category_column: category,
                value_column: installs,
                normalizer: ValueNormalizer::Installs,
            },
            AverageConfig {
                title: "Average rating per category".to_string(),
                category_column: category,
                value_column: rating,
                normalizer: ValueNormalizer::MissingAsZero,
            },
        ],
        drilldowns: vec![
            DrilldownConfig {
                category_column: category,
                category: "BOOKS_AND_REFERENCE".to_string(),
                value_column: installs,
                value_label: "installs".to_string(),
                only_if: Some(ColumnMatch {
                    column: installs,
                    equals: "10,000,000+".to_string(),
                }),
            },
            DrilldownConfig {
                category_column: category,
                category: "BOOKS_AND_REFERENCE".to_string(),
                value_column: rating,
                value_label: "rating".to_string(),
                only_if: None,
            },
        ],
    }
}

impl Config {
    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(file_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, file_path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(file_path, content)?;
        Ok(())
    }
}

/// One CSV record, kept as raw strings alongside the line it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub line: u64,
    pub fields: Vec<String>,
}

impl Row {
    pub fn new(line: u64, fields: Vec<String>) -> Self {
        Self { line, fields }
    }

    pub fn field(&self, column: usize) -> AnalysisResult<&str> {
        self.fields
            .get(column)
            .map(String::as_str)
            .ok_or(AnalysisError::MissingColumn {
                line: self.line,
                column,
                len: self.fields.len(),
            })
    }

    pub fn number(&self, column: usize, normalizer: ValueNormalizer) -> AnalysisResult<f64> {
        let raw = self.field(column)?;
        normalize_number(raw, normalizer)
            .trim()
            .parse::<f64>()
            .map_err(|_| AnalysisError::InvalidNumber {
                line: self.line,
                column,
                value: raw.to_string(),
            })
    }
}

/// Apply a [`ValueNormalizer`] to a raw field, returning the text to parse.
pub fn normalize_number(raw: &str, normalizer: ValueNormalizer) -> String {
    use regex::Regex;
    use std::sync::OnceLock;

    static INSTALLS_NOISE: OnceLock<Regex> = OnceLock::new();

    match normalizer {
        ValueNormalizer::None => raw.to_string(),
        ValueNormalizer::Installs => INSTALLS_NOISE
            .get_or_init(|| Regex::new(r"[+,]").unwrap())
            .replace_all(raw, "")
            .into_owned(),
        ValueNormalizer::MissingAsZero => raw.replace("NaN", "0"),
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub label: String,
    pub header: Vec<String>,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn column_count(&self) -> usize {
        self.header.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_normalizer_strips_plus_and_commas() {
        assert_eq!(normalize_number("10,000,000+", ValueNormalizer::Installs), "10000000");
        assert_eq!(normalize_number("0", ValueNormalizer::Installs), "0");
    }

    #[test]
    fn missing_marker_becomes_zero() {
        let row = Row::new(7, vec!["Pocket".into(), "NaN".into()]);
        assert_eq!(row.number(1, ValueNormalizer::MissingAsZero), Ok(0.0));
    }

    #[test]
    fn number_reports_line_and_raw_value() {
        let row = Row::new(12, vec!["Slack".into(), "Varies".into()]);
        assert_eq!(
            row.number(1, ValueNormalizer::None),
            Err(AnalysisError::InvalidNumber {
                line: 12,
                column: 1,
                value: "Varies".into(),
            })
        );
    }

    #[test]
    fn field_out_of_range_is_an_error() {
        let row = Row::new(3, vec!["only".into()]);
        assert_eq!(
            row.field(4),
            Err(AnalysisError::MissingColumn { line: 3, column: 4, len: 1 })
        );
    }

    #[test]
    fn default_config_survives_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app-profile.toml");
        let path = path.to_str().unwrap();

        let mut config = Config::default();
        config.sample_rows = 5;
        if let Some(dedup) = config.datasets[1].dedup.as_mut() {
            dedup.ordering = ReviewOrdering::Lexicographic;
        }
        config.save_to_file(path).unwrap();

        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("ordering = \"lexicographic\""));
        assert_eq!(Config::load_from_file(path).unwrap(), config);
    }

    #[test]
    fn loading_a_missing_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(Config::load_from_file(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn default_config_matches_marketplace_layouts() {
        let config = Config::default();
        let paths: Vec<&str> = config.datasets.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, ["AppleStore.csv", "googleplaystore.csv"]);
        assert_eq!(config.datasets[0].free_price, "0.0");
        assert_eq!(config.datasets[1].free_price, "0");
        assert!(config.datasets[0].dedup.is_none());
        assert_eq!(config.datasets[1].dedup.as_ref().map(|d| d.review_column), Some(3));
    }
}
