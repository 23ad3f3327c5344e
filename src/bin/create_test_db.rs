use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use dtracker_rs::{Expense, create_expense, get_all_categories, initialize_db};

/// How many days of sample expenses to generate.
const SAMPLE_DAYS: i64 = 730;

/// A utility for creating a test database for dtracker_rs populated with
/// sample expenses across the default categories.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let connection = Connection::open(output_path)?;

    initialize_db(&connection)?;

    println!("Generating sample expenses over the last two years...");

    let categories = get_all_categories(&connection)?;
    let today = OffsetDateTime::now_utc().date();
    let mut rng = Rng::new(0x5eed);
    let mut expenses_added = 0u32;

    for day_offset in 0..=SAMPLE_DAYS {
        let date = today - Duration::days(SAMPLE_DAYS - day_offset);

        // Zero to three expenses a day, with one or two most likely.
        let expenses_today = match rng.next_range(100) {
            0..=14 => 0,
            15..=49 => 1,
            50..=84 => 2,
            _ => 3,
        };

        for _ in 0..expenses_today {
            let category = &categories[rng.next_range(categories.len() as u64) as usize];
            let (min_cents, max_cents, descriptions) = sample_profile(category.name.as_ref());

            let cents = min_cents + rng.next_range(max_cents - min_cents);
            let amount = cents as f64 / 100.0;
            let description = descriptions[rng.next_range(descriptions.len() as u64) as usize];

            create_expense(
                Expense::build(amount, category.id, date).description(description),
                &connection,
            )?;
            expenses_added += 1;
        }
    }

    println!("Success! Added {expenses_added} expenses.");

    Ok(())
}

/// Plausible amount range (in cents) and descriptions for a category.
fn sample_profile(category_name: &str) -> (u64, u64, &'static [&'static str]) {
    match category_name {
        "Food" => (
            500,
            5000,
            &["Lunch out", "Supermarket run", "Morning coffee", "Takeaway order"],
        ),
        "Transport" => (
            1000,
            8000,
            &["Fuel", "Metro ticket", "City parking", "Bike share"],
        ),
        "Housing" => (
            2000,
            20000,
            &["Electricity bill", "Internet bill", "Home insurance", "Plumbing repair"],
        ),
        "Health" => (
            1500,
            12000,
            &["Doctor's visit", "Pharmacy", "Dentist", "Physiotherapy"],
        ),
        "Leisure" => (
            800,
            6000,
            &["Cinema", "Streaming subscription", "Concert ticket", "Gym"],
        ),
        "Shopping" => (
            1500,
            15000,
            &["New clothes", "Shoes", "Electronics", "Cosmetics"],
        ),
        "Education" => (
            1000,
            8000,
            &["Technical book", "Online course", "Conference", "Magazine subscription"],
        ),
        _ => (
            500,
            10000,
            &["Birthday gift", "Bank fees", "Haircut", "Miscellaneous"],
        ),
    }
}

/// A small deterministic generator so the sample data is reproducible.
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u64 {
        // xorshift64
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// A value in `0..bound`.
    fn next_range(&mut self, bound: u64) -> u64 {
        self.next() % bound.max(1)
    }
}
