use crate::analyzer::{rank_descending, MarketAnalysis};
use crate::models::{Dataset, Row};
use std::collections::BTreeMap;

/// Number of duplicate names listed after the duplicate count.
const DUPLICATE_SAMPLE: usize = 11;

/// Dump rows `start..end` (clamped to the slice), one blank line between
/// rows, optionally followed by the row and column counts.
pub fn explore(rows: &[Row], start: usize, end: usize, rows_and_columns: bool) -> String {
    let mut content = String::new();
    let end = end.min(rows.len());
    let start = start.min(end);

    for row in &rows[start..end] {
        content.push_str(&format!("{:?}\n\n", row.fields));
    }

    if rows_and_columns {
        content.push_str(&format!("Number of rows: {}\n", rows.len()));
        let columns = rows.first().map(|r| r.fields.len()).unwrap_or(0);
        content.push_str(&format!("Number of columns: {}\n", columns));
    }
    content
}

/// Header, the first `sample_rows` data rows and the dataset dimensions.
/// The row count excludes the header.
pub fn explore_dataset(dataset: &Dataset, path: &str, sample_rows: usize) -> String {
    let mut content = String::new();
    content.push_str(&format!("\n📂 {} ({})\n", dataset.label, path));
    content.push_str(&format!("{:?}\n\n", dataset.header));
    content.push_str(&explore(&dataset.rows, 0, sample_rows, false));
    content.push_str(&format!("Number of rows: {}\n", dataset.rows.len()));
    content.push_str(&format!("Number of columns: {}\n", dataset.column_count()));
    content
}

/// `key : value` lines, highest value first.
pub fn ranked_table(title: &str, table: &BTreeMap<String, f64>) -> String {
    let mut content = String::new();
    content.push_str(&format!("{}\n", title));
    content.push_str(&format!("{}\n", "=".repeat(title.chars().count())));
    for (value, key) in rank_descending(table) {
        content.push_str(&format!("{} : {:?}\n", key, value));
    }
    content
}

/// Full text report for one marketplace.
pub fn market_report(analysis: &MarketAnalysis, header: &[String], sample_rows: usize) -> String {
    let mut content = String::new();
    let column_name = |column: usize| {
        header
            .get(column)
            .cloned()
            .unwrap_or_else(|| format!("column {}", column))
    };

    content.push_str(&format!("\n📱 {}\n", analysis.label.to_uppercase()));
    content.push_str(&format!("{}\n\n", "=".repeat(analysis.label.chars().count() + 3)));

    content.push_str(&format!(
        "🔎 Number of duplicate {} apps is {}\n",
        analysis.label,
        analysis.duplicates.duplicates.len()
    ));
    if !analysis.duplicates.duplicates.is_empty() {
        let sample: Vec<&str> = analysis
            .duplicates
            .duplicates
            .iter()
            .take(DUPLICATE_SAMPLE)
            .map(String::as_str)
            .collect();
        content.push_str(&format!("   Sample duplicates: {}\n", sample.join(", ")));
    }

    if let Some(deduplicated) = &analysis.deduplicated {
        content.push_str(&format!(
            "🔄 Expected length after removing duplicates: {}\n",
            analysis.counts.loaded - analysis.duplicates.duplicates.len()
        ));
        content.push_str(&format!("   Actual number of unique apps: {}\n", deduplicated.len()));
        content.push('\n');
        content.push_str(&explore(deduplicated, 0, sample_rows, true));
    }

    content.push_str(&format!(
        "\n🧹 {} of {} apps left after removing non-English apps\n",
        analysis.counts.english,
        analysis.counts.deduplicated.unwrap_or(analysis.counts.loaded)
    ));
    content.push_str(&explore(&analysis.english, 0, 1, true));

    content.push_str(&format!(
        "\n💰 {} apps left after removing apps that are not free\n",
        analysis.counts.free
    ));
    content.push_str(&explore(&analysis.free, 0, sample_rows, true));

    for (column, table) in &analysis.frequencies {
        content.push('\n');
        content.push_str(&ranked_table(
            &format!("📊 Frequency of {} (%)", column_name(*column)),
            table,
        ));
    }

    for average in &analysis.averages {
        content.push('\n');
        content.push_str(&ranked_table(&format!("📈 {}", average.title), &average.table));
    }

    for drill in &analysis.drilldowns {
        let config = &drill.config;
        content.push_str(&format!(
            "\n🎯 {} apps in {}",
            config.category,
            column_name(config.category_column)
        ));
        if let Some(only_if) = &config.only_if {
            content.push_str(&format!(" with {} = {}", column_name(only_if.column), only_if.equals));
        }
        content.push('\n');
        if drill.entries.is_empty() {
            content.push_str("   (none)\n");
        }
        for entry in &drill.entries {
            content.push_str(&format!("{} has {} {}\n", entry.name, entry.value, config.value_label));
        }
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::StageCounts;
    use crate::cleaning::DuplicateScan;

    fn row(fields: &[&str]) -> Row {
        Row::new(2, fields.iter().map(|f| f.to_string()).collect())
    }

    #[test]
    fn explore_prints_rows_and_dimensions() {
        let rows = vec![row(&["Slack", "0"]), row(&["Pocket", "0"]), row(&["Kindle", "0"])];
        let text = explore(&rows, 0, 2, true);

        assert!(text.starts_with("[\"Slack\", \"0\"]\n\n[\"Pocket\", \"0\"]\n\n"));
        assert!(!text.contains("Kindle"));
        assert!(text.contains("Number of rows: 3\n"));
        assert!(text.contains("Number of columns: 2\n"));
    }

    #[test]
    fn explore_clamps_out_of_range_slice() {
        let rows = vec![row(&["Slack"])];
        assert_eq!(explore(&rows, 3, 10, false), "");
        assert_eq!(explore(&[], 0, 5, true), "Number of rows: 0\nNumber of columns: 0\n");
    }

    #[test]
    fn explore_dataset_shows_header_and_counts() {
        let dataset = Dataset {
            label: "App Store".into(),
            header: vec!["id".into(), "track_name".into()],
            rows: vec![row(&["284882215", "Facebook"]), row(&["389801252", "Instagram"])],
        };
        let text = explore_dataset(&dataset, "AppleStore.csv", 1);

        assert!(text.contains("📂 App Store (AppleStore.csv)"));
        assert!(text.contains("[\"id\", \"track_name\"]"));
        assert!(text.contains("Facebook"));
        assert!(!text.contains("Instagram"));
        assert!(text.ends_with("Number of rows: 2\nNumber of columns: 2\n"));
    }

    #[test]
    fn ranked_table_lists_highest_first() {
        let table: BTreeMap<String, f64> = [("Games".to_string(), 58.0), ("Reference".to_string(), 0.5)]
            .into_iter()
            .collect();
        let text = ranked_table("Genres", &table);
        assert_eq!(text, "Genres\n======\nGames : 58.0\nReference : 0.5\n");
    }

    #[test]
    fn unique_count_comes_from_deduplicated_rows() {
        let deduplicated = vec![row(&["Slack", "0"]), row(&["Slack", "0"]), row(&["Pocket", "0"])];
        let analysis = MarketAnalysis {
            label: "Google Play".into(),
            duplicates: DuplicateScan {
                unique_names: 2,
                duplicates: vec!["Slack".into()],
            },
            counts: StageCounts {
                loaded: 4,
                deduplicated: Some(3),
                english: 3,
                free: 3,
            },
            deduplicated: Some(deduplicated.clone()),
            english: deduplicated.clone(),
            free: deduplicated,
            frequencies: vec![],
            averages: vec![],
            drilldowns: vec![],
        };
        let text = market_report(&analysis, &[], 0);

        assert!(text.contains("Expected length after removing duplicates: 3\n"));
        assert!(text.contains("Actual number of unique apps: 3\n"));
    }
}
