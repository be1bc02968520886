use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The closed set of categories offered by input surfaces.
///
/// Records keep their category as a plain string, so a value outside this set
/// that arrives from storage or the remote service is preserved as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Drama,
    Comedy,
    Action,
    Thriller,
    #[serde(rename = "Sci-Fi")]
    SciFi,
    Fantasy,
    Horror,
    Documentary,
    Animation,
    Romance,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Drama,
        Category::Comedy,
        Category::Action,
        Category::Thriller,
        Category::SciFi,
        Category::Fantasy,
        Category::Horror,
        Category::Documentary,
        Category::Animation,
        Category::Romance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Drama => "Drama",
            Category::Comedy => "Comedy",
            Category::Action => "Action",
            Category::Thriller => "Thriller",
            Category::SciFi => "Sci-Fi",
            Category::Fantasy => "Fantasy",
            Category::Horror => "Horror",
            Category::Documentary => "Documentary",
            Category::Animation => "Animation",
            Category::Romance => "Romance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown category '{}', expected one of: {}", wanted, names.join(", "))
            })
    }
}

/// Names of the user-editable fields of a series.
///
/// The order of the variants is the order in which the form presents them,
/// which is also the order validation errors are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesField {
    Title,
    NumberOfSeasons,
    ReleaseDate,
    Director,
    ProductionCompany,
    Category,
    DateWatched,
}

impl SeriesField {
    pub const ALL: [SeriesField; 7] = [
        SeriesField::Title,
        SeriesField::NumberOfSeasons,
        SeriesField::ReleaseDate,
        SeriesField::Director,
        SeriesField::ProductionCompany,
        SeriesField::Category,
        SeriesField::DateWatched,
    ];

    /// Wire name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesField::Title => "title",
            SeriesField::NumberOfSeasons => "numberOfSeasons",
            SeriesField::ReleaseDate => "releaseDate",
            SeriesField::Director => "director",
            SeriesField::ProductionCompany => "productionCompany",
            SeriesField::Category => "category",
            SeriesField::DateWatched => "dateWatched",
        }
    }

    /// Human readable label used by the CLI
    pub fn label(&self) -> &'static str {
        match self {
            SeriesField::Title => "Title",
            SeriesField::NumberOfSeasons => "Number of Seasons",
            SeriesField::ReleaseDate => "Release Date",
            SeriesField::Director => "Director",
            SeriesField::ProductionCompany => "Production Company",
            SeriesField::Category => "Category",
            SeriesField::DateWatched => "Date Watched",
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, SeriesField::ReleaseDate | SeriesField::DateWatched)
    }
}

impl fmt::Display for SeriesField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeriesField {
    type Err = String;

    /// Accepts the wire name (`numberOfSeasons`) or a snake/kebab spelling
    /// (`number-of-seasons`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        SeriesField::ALL
            .iter()
            .copied()
            .find(|f| f.as_str().to_lowercase() == normalized)
            .ok_or_else(|| format!("unknown field '{}'", s))
    }
}

/// An unpersisted candidate record, exactly as entered by the user.
///
/// Every field is raw text; nothing here has been trimmed, parsed or checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeriesDraft {
    pub title: String,
    pub number_of_seasons: String,
    pub release_date: String,
    pub director: String,
    pub production_company: String,
    pub category: String,
    pub date_watched: String,
}

impl SeriesDraft {
    /// Raw value of a single field
    pub fn get(&self, field: SeriesField) -> &str {
        match field {
            SeriesField::Title => &self.title,
            SeriesField::NumberOfSeasons => &self.number_of_seasons,
            SeriesField::ReleaseDate => &self.release_date,
            SeriesField::Director => &self.director,
            SeriesField::ProductionCompany => &self.production_company,
            SeriesField::Category => &self.category,
            SeriesField::DateWatched => &self.date_watched,
        }
    }

    /// Replace the raw value of a single field
    pub fn set(&mut self, field: SeriesField, value: impl Into<String>) {
        let value = value.into();
        match field {
            SeriesField::Title => self.title = value,
            SeriesField::NumberOfSeasons => self.number_of_seasons = value,
            SeriesField::ReleaseDate => self.release_date = value,
            SeriesField::Director => self.director = value,
            SeriesField::ProductionCompany => self.production_company = value,
            SeriesField::Category => self.category = value,
            SeriesField::DateWatched => self.date_watched = value,
        }
    }
}

impl From<&SeriesRecord> for SeriesDraft {
    /// Prefill a draft from a stored record, the way the edit form does.
    fn from(record: &SeriesRecord) -> Self {
        Self {
            title: record.title.clone(),
            number_of_seasons: record
                .number_of_seasons
                .map(|n| n.to_string())
                .unwrap_or_default(),
            release_date: record.release_date.map(format_date).unwrap_or_default(),
            director: record.director.clone(),
            production_company: record.production_company.clone(),
            category: record.category.clone(),
            date_watched: record.date_watched.map(format_date).unwrap_or_default(),
        }
    }
}

/// The typed field set of a draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDetails {
    pub title: String,
    pub number_of_seasons: u32,
    #[serde(with = "lenient::date")]
    pub release_date: NaiveDate,
    pub director: String,
    pub production_company: String,
    pub category: String,
    #[serde(with = "lenient::date")]
    pub date_watched: NaiveDate,
}

/// A stored series.
///
/// Season count and dates are optional because records written by older
/// versions, or returned by a remote service, are not guaranteed to carry
/// them in a readable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRecord {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::seasons")]
    pub number_of_seasons: Option<u32>,
    #[serde(default, with = "lenient::optional_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub production_company: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, with = "lenient::optional_date")]
    pub date_watched: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl SeriesRecord {
    /// Build a record from validated details and the identity assigned on creation
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>, details: SeriesDetails) -> Self {
        Self {
            id: id.into(),
            title: details.title,
            number_of_seasons: Some(details.number_of_seasons),
            release_date: Some(details.release_date),
            director: details.director,
            production_company: details.production_company,
            category: details.category,
            date_watched: Some(details.date_watched),
            created_at,
        }
    }

    /// Replace every field except `id` and `created_at`
    pub fn apply(&mut self, details: SeriesDetails) {
        let id = std::mem::take(&mut self.id);
        *self = SeriesRecord::new(id, self.created_at, details);
    }

    /// Season count used by sorting and statistics; missing counts as zero
    pub fn seasons(&self) -> u32 {
        self.number_of_seasons.unwrap_or(0)
    }

    /// Text value of a string-valued field, empty for the others
    pub fn text(&self, field: SeriesField) -> &str {
        match field {
            SeriesField::Title => &self.title,
            SeriesField::Director => &self.director,
            SeriesField::ProductionCompany => &self.production_company,
            SeriesField::Category => &self.category,
            SeriesField::NumberOfSeasons | SeriesField::ReleaseDate | SeriesField::DateWatched => "",
        }
    }

    /// Date value of a date field, `None` when missing or not a date field
    pub fn date(&self, field: SeriesField) -> Option<NaiveDate> {
        match field {
            SeriesField::ReleaseDate => self.release_date,
            SeriesField::DateWatched => self.date_watched,
            _ => None,
        }
    }
}

/// Parse a calendar date as stored: `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Tolerant (de)serializers for values written by older clients.
mod lenient {
    use serde::de::{self, Deserializer};
    use serde::Deserialize;
    use serde_json::Value;

    pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(de::Error::custom(format!("invalid id: {}", other))),
        }
    }

    /// Season counts were historically stored as form strings ("5") as well as
    /// numbers. Anything unreadable becomes `None`.
    pub fn seasons<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
                .and_then(|n| u32::try_from(n).ok()),
            Some(Value::String(s)) => s.trim().parse::<u32>().ok(),
            _ => None,
        })
    }

    pub mod date {
        use chrono::NaiveDate;
        use serde::de::{self, Deserializer};
        use serde::{Deserialize, Serializer};

        pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&super::super::format_date(*date))
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw = String::deserialize(deserializer)?;
            super::super::parse_date(&raw)
                .ok_or_else(|| de::Error::custom(format!("invalid date: {}", raw)))
        }
    }

    pub mod optional_date {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer};
        use serde_json::Value;

        pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match date {
                Some(d) => serializer.serialize_str(&super::super::format_date(*d)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let value = Option::<Value>::deserialize(deserializer)?;
            Ok(match value {
                Some(Value::String(s)) => super::super::parse_date(&s),
                _ => None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn details() -> SeriesDetails {
        SeriesDetails {
            title: "Dark".to_string(),
            number_of_seasons: 3,
            release_date: NaiveDate::from_ymd_opt(2017, 12, 1).unwrap(),
            director: "Baran bo Odar".to_string(),
            production_company: "Netflix".to_string(),
            category: "Sci-Fi".to_string(),
            date_watched: NaiveDate::from_ymd_opt(2023, 5, 2).unwrap(),
        }
    }

    #[test]
    fn test_record_serializes_with_camel_case_names() {
        let created = DateTime::parse_from_rfc3339("2024-01-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let record = SeriesRecord::new("abc", created, details());
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["numberOfSeasons"], json!(3));
        assert_eq!(value["releaseDate"], json!("2017-12-01"));
        assert_eq!(value["productionCompany"], json!("Netflix"));
        assert_eq!(value["dateWatched"], json!("2023-05-02"));
        assert!(value["createdAt"].as_str().unwrap().starts_with("2024-01-01T10:00:00"));
    }

    #[test]
    fn test_legacy_record_with_string_fields_loads() {
        let payload = json!({
            "id": 17,
            "title": "The Office",
            "numberOfSeasons": "9",
            "releaseDate": "2005-03-24",
            "director": "Greg Daniels",
            "productionCompany": "NBC",
            "category": "Comedy",
            "dateWatched": "not a date",
            "createdAt": "2024-03-10T12:00:00.000Z"
        });

        let record: SeriesRecord = serde_json::from_value(payload).unwrap();
        assert_eq!(record.id, "17");
        assert_eq!(record.number_of_seasons, Some(9));
        assert_eq!(record.release_date, NaiveDate::from_ymd_opt(2005, 3, 24));
        assert_eq!(record.date_watched, None);
    }

    #[test]
    fn test_apply_keeps_identity() {
        let created = Utc::now();
        let mut record = SeriesRecord::new("keep-me", created, details());
        let mut replacement = details();
        replacement.title = "1899".to_string();
        replacement.number_of_seasons = 1;

        record.apply(replacement);

        assert_eq!(record.id, "keep-me");
        assert_eq!(record.created_at, created);
        assert_eq!(record.title, "1899");
        assert_eq!(record.number_of_seasons, Some(1));
    }

    #[test]
    fn test_field_and_category_parsing() {
        assert_eq!("numberOfSeasons".parse::<SeriesField>(), Ok(SeriesField::NumberOfSeasons));
        assert_eq!("date-watched".parse::<SeriesField>(), Ok(SeriesField::DateWatched));
        assert!("rating".parse::<SeriesField>().is_err());

        assert_eq!("sci-fi".parse::<Category>(), Ok(Category::SciFi));
        assert!("Western".parse::<Category>().is_err());
    }

    #[test]
    fn test_draft_prefilled_from_record() {
        let record = SeriesRecord::new("x", Utc::now(), details());
        let draft = SeriesDraft::from(&record);
        assert_eq!(draft.number_of_seasons, "3");
        assert_eq!(draft.release_date, "2017-12-01");
        assert_eq!(draft.get(SeriesField::Category), "Sci-Fi");
    }
}
