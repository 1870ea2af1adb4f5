use crate::error::AnalysisResult;
use crate::models::{ReviewOrdering, Row};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateScan {
    pub unique_names: usize,
    /// One entry per repeated occurrence, in input order.
    pub duplicates: Vec<String>,
}

/// Count how many rows repeat a name that was already seen.
pub fn scan_duplicates(rows: &[Row], name_column: usize) -> AnalysisResult<DuplicateScan> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();

    for row in rows {
        let name = row.field(name_column)?;
        if !seen.insert(name) {
            duplicates.push(name.to_string());
        }
    }

    Ok(DuplicateScan {
        unique_names: seen.len(),
        duplicates,
    })
}

/// Keep one row per name: the first row carrying that name's highest review count.
pub fn deduplicate(
    rows: &[Row],
    name_column: usize,
    review_column: usize,
    ordering: ReviewOrdering,
) -> AnalysisResult<Vec<Row>> {
    let highest = rows.iter().try_fold(
        HashMap::<&str, &Row>::new(),
        |mut highest, row| -> AnalysisResult<_> {
            let name = row.field(name_column)?;
            let replace = match highest.get(name) {
                None => true,
                Some(best) => compare_reviews(row, best, review_column, ordering)? == Ordering::Greater,
            };
            if replace {
                highest.insert(name, row);
            }
            Ok(highest)
        },
    )?;

    let mut kept = HashSet::new();
    let mut result = Vec::with_capacity(highest.len());
    for row in rows {
        let name = row.field(name_column)?;
        if kept.contains(name) {
            continue;
        }
        let best = highest[name];
        if compare_reviews(row, best, review_column, ordering)? == Ordering::Equal {
            kept.insert(name);
            result.push(row.clone());
        }
    }

    Ok(result)
}

fn compare_reviews(
    a: &Row,
    b: &Row,
    review_column: usize,
    ordering: ReviewOrdering,
) -> AnalysisResult<Ordering> {
    match ordering {
        ReviewOrdering::Lexicographic => Ok(a.field(review_column)?.cmp(b.field(review_column)?)),
        ReviewOrdering::Numeric => Ok(review_count(a, review_column)?.cmp(&review_count(b, review_column)?)),
    }
}

/// Counts that do not parse (shifted rows, "3.0M") rank below every real
/// count and compare as text among themselves.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum ReviewCount<'a> {
    Unparsed(&'a str),
    Count(u64),
}

fn review_count(row: &Row, review_column: usize) -> AnalysisResult<ReviewCount<'_>> {
    let raw = row.field(review_column)?;
    Ok(match raw.trim().parse::<u64>() {
        Ok(count) => ReviewCount::Count(count),
        Err(_) => ReviewCount::Unparsed(raw),
    })
}

/// True when every character is in the 0..=127 range.
pub fn is_english(name: &str) -> bool {
    name.chars().all(|c| c as u32 <= 127)
}

/// Drop rows whose name holds any non-ASCII character.
pub fn filter_english(rows: &[Row], name_column: usize) -> AnalysisResult<Vec<Row>> {
    keep_rows(rows, |row| Ok(is_english(row.field(name_column)?)))
}

/// Keep rows whose price field is exactly `free_price`. No numeric
/// normalization: "0.00" does not match "0.0".
pub fn filter_free(rows: &[Row], price_column: usize, free_price: &str) -> AnalysisResult<Vec<Row>> {
    keep_rows(rows, |row| Ok(row.field(price_column)? == free_price))
}

fn keep_rows<F>(rows: &[Row], mut keep: F) -> AnalysisResult<Vec<Row>>
where
    F: FnMut(&Row) -> AnalysisResult<bool>,
{
    rows.iter()
        .filter_map(|row| match keep(row) {
            Ok(true) => Some(Ok(row.clone())),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        })
        .collect()
}
