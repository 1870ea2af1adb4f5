//! Exploratory analysis of App Store and Google Play listings: clean each
//! dataset down to free English apps, then rank genres and categories by
//! share of listings, average installs and average rating.

pub mod analyzer;
pub mod cleaning;
pub mod error;
pub mod loader;
pub mod models;
pub mod report;
