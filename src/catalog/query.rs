use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::series::{SeriesField, SeriesRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction '{}'", other)),
        }
    }
}

/// Search term plus sort order for the listing view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesQuery {
    pub search: String,
    pub sort_by: SeriesField,
    pub direction: SortDirection,
}

impl Default for SeriesQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort_by: SeriesField::Title,
            direction: SortDirection::Asc,
        }
    }
}

impl SeriesQuery {
    pub fn new(search: impl Into<String>, sort_by: SeriesField, direction: SortDirection) -> Self {
        Self {
            search: search.into(),
            sort_by,
            direction,
        }
    }
}

/// Case-insensitive match of `term` against title, director, production
/// company or category. An empty term matches every record.
pub fn matches_search(record: &SeriesRecord, term: &str) -> bool {
    let term = term.to_lowercase();
    if term.is_empty() {
        return true;
    }
    [
        SeriesField::Title,
        SeriesField::Director,
        SeriesField::ProductionCompany,
        SeriesField::Category,
    ]
    .iter()
    .any(|field| record.text(*field).to_lowercase().contains(&term))
}

/// Ascending order of two records on one field.
///
/// Season counts compare as integers (missing is 0), dates as calendar days
/// (missing is the Unix epoch), everything else as lowercased text.
pub fn compare_by(a: &SeriesRecord, b: &SeriesRecord, field: SeriesField) -> Ordering {
    match field {
        SeriesField::NumberOfSeasons => a.seasons().cmp(&b.seasons()),
        SeriesField::ReleaseDate | SeriesField::DateWatched => {
            date_or_epoch(a.date(field)).cmp(&date_or_epoch(b.date(field)))
        }
        _ => a
            .text(field)
            .to_lowercase()
            .cmp(&b.text(field).to_lowercase()),
    }
}

/// `NaiveDate::default()` is 1970-01-01.
pub(crate) fn date_or_epoch(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_default()
}

/// Filter a collection by the query's search term and sort it.
///
/// The sort is stable in both directions: records with equal keys keep their
/// relative input order.
pub fn filter_and_sort<'a>(collection: &'a [SeriesRecord], query: &SeriesQuery) -> Vec<&'a SeriesRecord> {
    let mut view: Vec<&SeriesRecord> = collection
        .iter()
        .filter(|record| matches_search(record, &query.search))
        .collect();
    view.sort_by(|a, b| query.direction.apply(compare_by(a, b, query.sort_by)));
    view
}
