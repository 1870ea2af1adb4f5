use crate::cleaning::{self, DuplicateScan};
use crate::error::AnalysisResult;
use crate::models::{AverageConfig, DatasetConfig, DrilldownConfig, Row, ValueNormalizer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Category value -> percentage of rows carrying it.
pub type FrequencyTable = BTreeMap<String, f64>;

/// Category value -> mean of a numeric column among rows in that category.
pub type AverageTable = BTreeMap<String, f64>;

pub fn frequency_table(rows: &[Row], category_column: usize) -> AnalysisResult<FrequencyTable> {
    let counts = rows.iter().try_fold(BTreeMap::<&str, usize>::new(), |mut counts, row| -> AnalysisResult<_> {
        *counts.entry(row.field(category_column)?).or_insert(0) += 1;
        Ok(counts)
    })?;

    let total = rows.len() as f64;
    Ok(counts
        .into_iter()
        .map(|(key, count)| (key.to_string(), count as f64 / total * 100.0))
        .collect())
}

pub fn average_table(
    rows: &[Row],
    category_column: usize,
    value_column: usize,
    normalizer: ValueNormalizer,
) -> AnalysisResult<AverageTable> {
    let sums = rows.iter().try_fold(BTreeMap::<&str, (f64, usize)>::new(), |mut sums, row| -> AnalysisResult<_> {
        let value = row.number(value_column, normalizer)?;
        let entry = sums.entry(row.field(category_column)?).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
        Ok(sums)
    })?;

    Ok(sums
        .into_iter()
        .filter(|(_, (_, count))| *count > 0)
        .map(|(key, (total, count))| (key.to_string(), total / count as f64))
        .collect())
}

/// Entries of a table as `(value, key)`, highest value first. Equal values
/// are ordered by key, highest first.
pub fn rank_descending(table: &BTreeMap<String, f64>) -> impl Iterator<Item = (f64, &str)> + '_ {
    let mut entries: Vec<(f64, &str)> = table.iter().map(|(key, value)| (*value, key.as_str())).collect();
    entries.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.1.cmp(a.1))
    });
    entries.into_iter()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrilldownEntry {
    pub name: String,
    pub value: String,
}

/// Names and one chosen column for every row in a single category.
pub fn drilldown(rows: &[Row], name_column: usize, config: &DrilldownConfig) -> AnalysisResult<Vec<DrilldownEntry>> {
    let mut entries = Vec::new();
    for row in rows {
        if row.field(config.category_column)? != config.category {
            continue;
        }
        if let Some(only_if) = &config.only_if {
            if row.field(only_if.column)? != only_if.equals {
                continue;
            }
        }
        entries.push(DrilldownEntry {
            name: row.field(name_column)?.to_string(),
            value: row.field(config.value_column)?.to_string(),
        });
    }
    Ok(entries)
}

#[derive(Debug, Clone)]
pub struct StageCounts {
    pub loaded: usize,
    pub deduplicated: Option<usize>,
    pub english: usize,
    pub free: usize,
}

#[derive(Debug, Clone)]
pub struct AverageReport {
    pub title: String,
    pub table: AverageTable,
}

#[derive(Debug, Clone)]
pub struct DrilldownReport {
    pub config: DrilldownConfig,
    pub entries: Vec<DrilldownEntry>,
}

#[derive(Debug, Clone)]
pub struct MarketAnalysis {
    pub label: String,
    pub duplicates: DuplicateScan,
    pub counts: StageCounts,
    pub deduplicated: Option<Vec<Row>>,
    pub english: Vec<Row>,
    pub free: Vec<Row>,
    /// (column, table) for every configured frequency column.
    pub frequencies: Vec<(usize, FrequencyTable)>,
    pub averages: Vec<AverageReport>,
    pub drilldowns: Vec<DrilldownReport>,
}

pub struct MarketAnalyzer<'a> {
    pub config: &'a DatasetConfig,
}

impl<'a> MarketAnalyzer<'a> {
    pub fn new(config: &'a DatasetConfig) -> Self {
        Self { config }
    }

    /// Clean the rows of one marketplace and compute every configured table.
    pub fn analyze(&self, rows: &[Row]) -> AnalysisResult<MarketAnalysis> {
        let config = self.config;

        // Step 1: Look for repeated names
        let duplicates = cleaning::scan_duplicates(rows, config.name_column)?;
        debug!(dataset = %config.label, duplicates = duplicates.duplicates.len(), "Scanned names");

        // Step 2: Keep the most reviewed row per name
        let deduplicated = match &config.dedup {
            Some(dedup) => Some(cleaning::deduplicate(
                rows,
                config.name_column,
                dedup.review_column,
                dedup.ordering,
            )?),
            None => None,
        };
        let cleaned = deduplicated.as_deref().unwrap_or(rows);

        // Step 3: English, free apps only
        let english = cleaning::filter_english(cleaned, config.name_column)?;
        let free = cleaning::filter_free(&english, config.price_column, &config.free_price)?;

        let counts = StageCounts {
            loaded: rows.len(),
            deduplicated: deduplicated.as_ref().map(Vec::len),
            english: english.len(),
            free: free.len(),
        };
        info!(
            dataset = %config.label,
            loaded = counts.loaded,
            deduplicated = ?counts.deduplicated,
            english = counts.english,
            free = counts.free,
            "Cleaned dataset"
        );

        // Step 4: Tables over the free English apps
        let frequencies = config
            .frequency_columns
            .iter()
            .map(|&column| -> AnalysisResult<_> { Ok((column, frequency_table(&free, column)?)) })
            .collect::<AnalysisResult<Vec<_>>>()?;

        let averages = config
            .averages
            .iter()
            .map(|average| self.average_report(&free, average))
            .collect::<AnalysisResult<Vec<_>>>()?;

        let drilldowns = config
            .drilldowns
            .iter()
            .map(|drill| -> AnalysisResult<_> {
                Ok(DrilldownReport {
                    config: drill.clone(),
                    entries: drilldown(&free, config.name_column, drill)?,
                })
            })
            .collect::<AnalysisResult<Vec<_>>>()?;

        Ok(MarketAnalysis {
            label: config.label.clone(),
            duplicates,
            counts,
            deduplicated,
            english,
            free,
            frequencies,
            averages,
            drilldowns,
        })
    }

    fn average_report(&self, rows: &[Row], average: &AverageConfig) -> AnalysisResult<AverageReport> {
        Ok(AverageReport {
            title: average.title.clone(),
            table: average_table(rows, average.category_column, average.value_column, average.normalizer)?,
        })
    }
}
