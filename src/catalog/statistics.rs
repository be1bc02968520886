use std::collections::BTreeMap;

use serde::Serialize;

use super::query::date_or_epoch;
use super::series::SeriesRecord;

/// Shown when the collection has no categorized series.
pub const NO_FAVORITE_CATEGORY: &str = "N/A";

/// Number of entries in [`SeriesStatistics::recently_watched`].
pub const RECENTLY_WATCHED_LIMIT: usize = 5;

/// Aggregate figures over the whole collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStatistics {
    pub total_series: usize,
    pub total_seasons: u64,
    pub category_count: BTreeMap<String, usize>,
    pub favorite_category: String,
    pub recently_watched: Vec<SeriesRecord>,
}

impl SeriesStatistics {
    /// Mean number of seasons per series, 0 for an empty collection
    pub fn average_seasons(&self) -> f64 {
        if self.total_series == 0 {
            0.0
        } else {
            self.total_seasons as f64 / self.total_series as f64
        }
    }

    /// Percentage of the collection filed under `category`
    pub fn category_share(&self, category: &str) -> f64 {
        match self.category_count.get(category) {
            Some(count) if self.total_series > 0 => {
                *count as f64 * 100.0 / self.total_series as f64
            }
            _ => 0.0,
        }
    }
}

pub fn compute_statistics(collection: &[SeriesRecord]) -> SeriesStatistics {
    let total_seasons = collection.iter().map(|r| u64::from(r.seasons())).sum();

    // Categories in first-seen order, so the favorite tie-break is by input order.
    let mut seen: Vec<(&str, usize)> = Vec::new();
    for record in collection {
        if record.category.is_empty() {
            continue;
        }
        match seen.iter_mut().find(|(name, _)| *name == record.category) {
            Some((_, count)) => *count += 1,
            None => seen.push((record.category.as_str(), 1)),
        }
    }

    let mut favorite: Option<(&str, usize)> = None;
    for (name, count) in &seen {
        if favorite.map_or(true, |(_, best)| *count > best) {
            favorite = Some((*name, *count));
        }
    }

    let mut by_watched: Vec<&SeriesRecord> = collection.iter().collect();
    by_watched.sort_by(|a, b| date_or_epoch(b.date_watched).cmp(&date_or_epoch(a.date_watched)));

    SeriesStatistics {
        total_series: collection.len(),
        total_seasons,
        category_count: seen
            .iter()
            .map(|(name, count)| (name.to_string(), *count))
            .collect(),
        favorite_category: favorite
            .map(|(name, _)| name.to_string())
            .unwrap_or_else(|| NO_FAVORITE_CATEGORY.to_string()),
        recently_watched: by_watched
            .into_iter()
            .take(RECENTLY_WATCHED_LIMIT)
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn record(id: &str, category: &str, seasons: Option<u32>, watched: Option<(i32, u32, u32)>) -> SeriesRecord {
        SeriesRecord {
            id: id.to_string(),
            title: format!("Series {}", id),
            number_of_seasons: seasons,
            release_date: None,
            director: "Someone".to_string(),
            production_company: "Studio".to_string(),
            category: category.to_string(),
            date_watched: watched.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_collection_defaults() {
        let stats = compute_statistics(&[]);
        assert_eq!(stats.total_series, 0);
        assert_eq!(stats.total_seasons, 0);
        assert!(stats.category_count.is_empty());
        assert_eq!(stats.favorite_category, "N/A");
        assert!(stats.recently_watched.is_empty());
        assert_eq!(stats.average_seasons(), 0.0);
    }

    #[test]
    fn test_favorite_category_and_counts() {
        let collection = vec![
            record("1", "Drama", Some(5), None),
            record("2", "Comedy", Some(9), None),
            record("3", "Drama", Some(6), None),
            record("4", "Comedy", Some(2), None),
            record("5", "Comedy", Some(3), None),
        ];

        let stats = compute_statistics(&collection);
        assert_eq!(stats.total_series, 5);
        assert_eq!(stats.total_seasons, 25);
        assert_eq!(stats.favorite_category, "Comedy");
        assert_eq!(stats.category_count.get("Drama"), Some(&2));
        assert_eq!(stats.category_count.get("Comedy"), Some(&3));
        assert_eq!(stats.category_count.len(), 2);
        assert_eq!(stats.average_seasons(), 5.0);
        assert_eq!(stats.category_share("Comedy"), 60.0);
    }

    #[test]
    fn test_favorite_tie_goes_to_first_encountered() {
        let collection = vec![
            record("1", "Horror", None, None),
            record("2", "Action", None, None),
            record("3", "Action", None, None),
            record("4", "Horror", None, None),
        ];
        assert_eq!(compute_statistics(&collection).favorite_category, "Horror");
    }

    #[test]
    fn test_missing_values_are_skipped_or_zero() {
        let collection = vec![record("1", "", None, None), record("2", "Drama", Some(4), None)];
        let stats = compute_statistics(&collection);
        assert_eq!(stats.total_seasons, 4);
        assert_eq!(stats.category_count.len(), 1);
        assert_eq!(stats.favorite_category, "Drama");
    }

    #[test]
    fn test_recently_watched_top_five() {
        let collection = vec![
            record("a", "Drama", None, Some((2024, 1, 15))),
            record("b", "Drama", None, Some((2024, 2, 20))),
            record("c", "Drama", None, None),
            record("d", "Drama", None, Some((2024, 3, 10))),
            record("e", "Drama", None, Some((2023, 12, 5))),
            record("f", "Drama", None, Some((2024, 1, 28))),
        ];

        let stats = compute_statistics(&collection);
        let ids: Vec<&str> = stats.recently_watched.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "b", "f", "a", "e"]);
    }
}
