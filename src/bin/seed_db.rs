use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;

use spendtrack::{
    Error,
    db::initialize,
    models::CategoryData,
    stores::{CategoryStore, sqlite::SQLiteCategoryStore},
};

/// A utility for creating the expense tracker database with the default
/// categories.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    db_path: String,
}

const DEFAULT_CATEGORIES: [(&str, &str, &str); 8] = [
    ("Food & Dining", "#FF6B6B", "🍔"),
    ("Transportation", "#4ECDC4", "🚗"),
    ("Shopping", "#45B7D1", "🛍️"),
    ("Entertainment", "#FFA07A", "🎬"),
    ("Bills & Utilities", "#98D8C8", "💡"),
    ("Healthcare", "#F7B731", "🏥"),
    ("Education", "#5F27CD", "📚"),
    ("Others", "#95A5A6", "📌"),
];

/// Create the database and insert the default categories, skipping any that
/// already exist.
fn main() -> Result<(), Error> {
    let args = Args::parse();

    println!("Creating database at {:?}", args.db_path);
    let connection = Connection::open(&args.db_path)?;
    initialize(&connection)?;

    let store = SQLiteCategoryStore::new(Arc::new(Mutex::new(connection)));

    for (name, color, icon) in DEFAULT_CATEGORIES {
        let result = store.create(CategoryData {
            name: name.to_owned(),
            color: color.to_owned(),
            icon: Some(icon.to_owned()),
        });

        match result {
            Ok(category) => println!("Created category {:?}", category.name),
            Err(Error::DuplicateCategoryName) => {
                println!("Category {name:?} already exists, skipping")
            }
            Err(error) => return Err(error),
        }
    }

    println!("Success!");

    Ok(())
}
