use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use super::series::{parse_date, SeriesDetails, SeriesDraft, SeriesField};

pub const MIN_SEASONS: i64 = 1;
pub const MAX_SEASONS: i64 = 50;

/// Per-field messages for a draft that cannot be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[error("{}", summarize(.0))]
pub struct ValidationErrors(BTreeMap<SeriesField, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: SeriesField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SeriesField, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

/// `field: message` pairs joined with `; `
fn summarize(errors: &BTreeMap<SeriesField, String>) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Check one raw field value against today's date.
///
/// Returns `None` when the value is acceptable.
pub fn validate_field(field: SeriesField, value: &str) -> Option<String> {
    validate_field_on(field, value, Utc::now().date_naive())
}

/// Check one raw field value; dates after `today` are rejected.
pub fn validate_field_on(field: SeriesField, value: &str, today: NaiveDate) -> Option<String> {
    let trimmed = value.trim();
    let message = match field {
        SeriesField::Title => {
            if trimmed.is_empty() {
                "Title is required"
            } else {
                return None;
            }
        }
        SeriesField::NumberOfSeasons => {
            if trimmed.is_empty() {
                "Number of seasons is required"
            } else {
                match parse_seasons(trimmed) {
                    Some(n) if (MIN_SEASONS..=MAX_SEASONS).contains(&n) => return None,
                    _ => "Must be a number between 1 and 50",
                }
            }
        }
        SeriesField::ReleaseDate => return check_date(trimmed, today, "Release date"),
        SeriesField::DateWatched => return check_date(trimmed, today, "Date watched"),
        SeriesField::Director => {
            return check_name(trimmed, "Director is required", "Director name")
        }
        SeriesField::ProductionCompany => {
            return check_name(
                trimmed,
                "Production company is required",
                "Production company",
            )
        }
        SeriesField::Category => {
            // Presence only: values come from a closed list of choices.
            if trimmed.is_empty() {
                "Category is required"
            } else {
                return None;
            }
        }
    };
    Some(message.to_string())
}

fn check_name(trimmed: &str, required: &str, label: &str) -> Option<String> {
    if trimmed.is_empty() {
        Some(required.to_string())
    } else if trimmed.chars().count() < 2 {
        Some(format!("{} must be at least 2 characters", label))
    } else {
        None
    }
}

fn check_date(trimmed: &str, today: NaiveDate, label: &str) -> Option<String> {
    if trimmed.is_empty() {
        return Some(format!("{} is required", label));
    }
    match parse_date(trimmed) {
        None => Some(format!("{} must be a valid date (YYYY-MM-DD)", label)),
        Some(date) if date > today => Some(format!("{} cannot be in the future", label)),
        Some(_) => None,
    }
}

/// Numeric check with integer truncation, so "5.5" counts as 5.
fn parse_seasons(trimmed: &str) -> Option<i64> {
    let number: f64 = trimmed.parse().ok()?;
    if !number.is_finite() {
        return None;
    }
    Some(number.trunc() as i64)
}

/// Validate every field of a draft against today's date.
pub fn validate_draft(draft: &SeriesDraft) -> Result<SeriesDetails, ValidationErrors> {
    validate_draft_on(draft, Utc::now().date_naive())
}

/// Validate every field of a draft and, if all pass, produce typed details.
pub fn validate_draft_on(
    draft: &SeriesDraft,
    today: NaiveDate,
) -> Result<SeriesDetails, ValidationErrors> {
    let mut errors = BTreeMap::new();
    for field in SeriesField::ALL {
        if let Some(message) = validate_field_on(field, draft.get(field), today) {
            errors.insert(field, message);
        }
    }
    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    let seasons = parse_seasons(draft.number_of_seasons.trim())
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or_default();
    let release_date = parse_date(&draft.release_date).unwrap_or(today);
    let date_watched = parse_date(&draft.date_watched).unwrap_or(today);

    Ok(SeriesDetails {
        title: draft.title.trim().to_string(),
        number_of_seasons: seasons,
        release_date,
        director: draft.director.trim().to_string(),
        production_company: draft.production_company.trim().to_string(),
        category: draft.category.trim().to_string(),
        date_watched,
    })
}
