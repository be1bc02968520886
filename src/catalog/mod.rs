//! Series catalog
//!
//! The pure part of the journal: the record model, input sanitizing and
//! validation, and the listing and statistics views derived from a
//! collection. Nothing in here performs I/O.

pub mod query;
pub mod samples;
pub mod sanitize;
pub mod series;
pub mod statistics;
pub mod validation;

pub use query::{filter_and_sort, SeriesQuery, SortDirection};
pub use sanitize::{sanitize_draft, sanitize_email, sanitize_text};
pub use series::{Category, SeriesDetails, SeriesDraft, SeriesField, SeriesRecord};
pub use statistics::{compute_statistics, SeriesStatistics, NO_FAVORITE_CATEGORY};
pub use validation::{validate_draft, validate_field, ValidationErrors};
