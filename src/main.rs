use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, LevelFilter};
use series_journal::catalog::{
    Category, SeriesDraft, SeriesField, SeriesQuery, SeriesRecord, SortDirection,
};
use series_journal::core::config::Config;
use series_journal::database::{open_store, SeriesStore, StoreError};

#[derive(Parser)]
#[clap(author, version, about = "Series Journal - keep track of the TV series you have watched")]
struct Cli {
    /// Path to config file
    #[clap(short, long, default_value = "series-journal.toml")]
    config: String,

    /// Debug mode
    #[clap(short, long)]
    debug: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a series you have watched
    Add(SeriesArgs),
    /// Change a recorded series; omitted fields keep their stored value
    Edit {
        id: String,
        #[clap(flatten)]
        fields: SeriesArgs,
    },
    /// Delete a recorded series
    Remove { id: String },
    /// Show one series
    Show { id: String },
    /// List series, optionally filtered and sorted
    List {
        /// Match against title, director, production company or category
        #[clap(short, long, default_value = "")]
        search: String,
        /// Field to sort by (title, category, director, numberOfSeasons, releaseDate, dateWatched)
        #[clap(long, default_value = "title")]
        sort_by: SeriesField,
        /// Sort descending
        #[clap(long)]
        desc: bool,
    },
    /// Show statistics about the journal
    Stats,
    /// Replace the journal with a few well known series
    Sample,
    /// Delete every series
    Clear,
    /// About this application
    About,
}

#[derive(Args)]
struct SeriesArgs {
    #[clap(long)]
    title: Option<String>,
    #[clap(long)]
    seasons: Option<String>,
    /// Season release date (YYYY-MM-DD)
    #[clap(long)]
    release_date: Option<String>,
    #[clap(long)]
    director: Option<String>,
    #[clap(long)]
    production_company: Option<String>,
    #[clap(long)]
    category: Option<Category>,
    /// Date watched (YYYY-MM-DD)
    #[clap(long)]
    watched: Option<String>,
}

impl SeriesArgs {
    /// Overlay the given flags on a draft
    fn apply_to(self, draft: &mut SeriesDraft) {
        let values = [
            (SeriesField::Title, self.title),
            (SeriesField::NumberOfSeasons, self.seasons),
            (SeriesField::ReleaseDate, self.release_date),
            (SeriesField::Director, self.director),
            (SeriesField::ProductionCompany, self.production_company),
            (SeriesField::Category, self.category.map(|c| c.to_string())),
            (SeriesField::DateWatched, self.watched),
        ];
        for (field, value) in values {
            if let Some(value) = value {
                draft.set(field, value);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logger; RUST_LOG still takes precedence
    let log_level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .init();

    if let Command::About = cli.command {
        print_about();
        return Ok(());
    }

    let config = Config::load(&cli.config)?;
    let store = open_store(&config).await?;

    run(&store, cli.command).await
}

async fn run(store: &SeriesStore, command: Command) -> Result<()> {
    match command {
        Command::Add(fields) => {
            let mut draft = SeriesDraft::default();
            fields.apply_to(&mut draft);
            let record = report(store.create(&draft).await)?;
            println!("Series added successfully!");
            print_record(&record);
        }
        Command::Edit { id, fields } => {
            let existing = report(store.get(&id).await)?;
            let mut draft = SeriesDraft::from(&existing);
            fields.apply_to(&mut draft);
            let record = report(store.update(&id, &draft).await)?;
            println!("Series updated successfully!");
            print_record(&record);
        }
        Command::Remove { id } => {
            report(store.delete(&id).await)?;
            println!("Series {} deleted.", id);
        }
        Command::Show { id } => {
            let record = report(store.get(&id).await)?;
            print_record(&record);
        }
        Command::List {
            search,
            sort_by,
            desc,
        } => {
            let direction = if desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
            let view = store
                .filtered(&SeriesQuery::new(search, sort_by, direction))
                .await;
            print_list(&view, store.len().await);
        }
        Command::Stats => print_statistics(store).await,
        Command::Sample => {
            let created = report(store.load_sample_data().await)?;
            println!("Replaced the journal with {} sample series.", created.len());
        }
        Command::Clear => {
            let removed = report(store.clear_all().await)?;
            println!("Removed {} series.", removed);
        }
        Command::About => print_about(),
    }
    Ok(())
}

/// Print store errors in a user friendly way before handing them to anyhow
fn report<T>(result: Result<T, StoreError>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(StoreError::Validation(errors)) => {
            println!("The series could not be saved:");
            for (field, message) in errors.iter() {
                println!("  {}: {}", field.label(), message);
            }
            bail!("validation failed for {} field(s)", errors.len())
        }
        Err(StoreError::NotFound(id)) => bail!("Series not found: {}", id),
        Err(StoreError::Persistence(e)) => {
            bail!("Could not reach storage ({}). Please try again.", e)
        }
        Err(e) => Err(e.into()),
    }
}

fn display_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_record(record: &SeriesRecord) {
    println!("  ID:                 {}", record.id);
    println!("  Title:              {}", record.title);
    println!(
        "  Seasons:            {}",
        record
            .number_of_seasons
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!("  Release Date:       {}", display_date(record.release_date));
    println!("  Director:           {}", record.director);
    println!("  Production Company: {}", record.production_company);
    println!("  Category:           {}", record.category);
    println!("  Date Watched:       {}", display_date(record.date_watched));
}

fn print_list(view: &[SeriesRecord], total: usize) {
    if view.is_empty() {
        println!("No series found.");
        return;
    }
    println!("Showing {} of {} series:", view.len(), total);
    for record in view {
        println!(
            "  {:<38} {:<30} {:>3} season(s)  {:<12} watched {}",
            record.id,
            record.title,
            record.seasons(),
            record.category,
            display_date(record.date_watched)
        );
    }
}

async fn print_statistics(store: &SeriesStore) {
    let stats = store.statistics().await;
    info!("Computed statistics over {} series", stats.total_series);

    println!("Statistics:");
    println!("  Total series:      {}", stats.total_series);
    println!("  Total seasons:     {}", stats.total_seasons);
    println!("  Average seasons:   {:.1}", stats.average_seasons());
    println!("  Favorite category: {}", stats.favorite_category);

    if !stats.category_count.is_empty() {
        println!("Categories:");
        for (category, count) in &stats.category_count {
            println!(
                "  {:<12} {:>3}  ({:.0}%)",
                category,
                count,
                stats.category_share(category)
            );
        }
    }

    if !stats.recently_watched.is_empty() {
        println!("Recently watched:");
        for record in &stats.recently_watched {
            println!("  {}  {}", display_date(record.date_watched), record.title);
        }
    }
}

fn print_about() {
    println!("\n====================================================");
    println!("  SERIES JOURNAL v{}", env!("CARGO_PKG_VERSION"));
    println!("====================================================");
    println!("  Record the series you watch, search and sort them,");
    println!("  and see which categories you enjoy the most.");
    println!("  Storage: local JSON file or a remote /series API.");
    println!("====================================================\n");
}
