use super::series::{Category, SeriesDraft};

/// A handful of well known series used to populate an empty journal.
pub fn sample_drafts() -> Vec<SeriesDraft> {
    [
        ("Breaking Bad", 5, "2008-01-20", "Vince Gilligan", "AMC", Category::Drama, "2024-01-15"),
        ("Stranger Things", 4, "2016-07-15", "The Duffer Brothers", "Netflix", Category::SciFi, "2024-02-20"),
        ("The Office", 9, "2005-03-24", "Greg Daniels", "NBC", Category::Comedy, "2024-03-10"),
        ("Game of Thrones", 8, "2011-04-17", "David Benioff", "HBO", Category::Fantasy, "2023-12-05"),
        ("The Crown", 6, "2016-11-04", "Peter Morgan", "Netflix", Category::Drama, "2024-01-28"),
    ]
    .into_iter()
    .map(|(title, seasons, released, director, company, category, watched)| SeriesDraft {
        title: title.to_string(),
        number_of_seasons: seasons.to_string(),
        release_date: released.to_string(),
        director: director.to_string(),
        production_company: company.to_string(),
        category: category.to_string(),
        date_watched: watched.to_string(),
    })
    .collect()
}
