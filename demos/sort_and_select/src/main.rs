//! FileDB sort and select
//!
//! Sorts users by how many favourites they have, with and without a
//! username tie-breaker, and projects the result down to usernames.

use clap::Parser;
use filedb_core::{Config, CoreResult, Database, Dataset, Selector};
use serde::Deserialize;
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Sort and project query results.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the collection files (in memory if omitted)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Persist every change immediately
    #[arg(short, long)]
    autosave: bool,
}

#[derive(Deserialize)]
struct Username {
    username: String,
}

fn favourites(user: &Value) -> usize {
    user["favourites"].as_array().map_or(0, Vec::len)
}

fn by_favourites(a: &Value, b: &Value) -> Ordering {
    favourites(a).cmp(&favourites(b))
}

fn by_username(a: &Value, b: &Value) -> Ordering {
    a["username"].as_str().unwrap_or_default().cmp(b["username"].as_str().unwrap_or_default())
}

fn print_usernames(label: &str, dataset: &mut Dataset) -> CoreResult<()> {
    let names: Vec<String> = dataset
        .value_as::<Username>()?
        .into_iter()
        .map(|u| u.username)
        .collect();
    println!("{label}: {}", names.join(", "));
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let db = match &cli.root {
        Some(root) => Database::open(Config::new().root_dir(root).autosave(cli.autosave))?,
        None => Database::open_in_memory(),
    };
    let users = db.collection("users")?;

    let inserted = users.insert_many(vec![
        json!({ "username": "foo", "favourites": ["🍎 Apple", "🍐 Pear"] }),
        json!({ "username": "baz", "favourites": ["🍌 Banana"] }),
        json!({ "username": "bar", "favourites": ["🍌 Banana"] }),
    ])?;
    info!(count = inserted.len(), "inserted users");

    // baz, bar, foo
    print_usernames(
        "by favourites",
        users
            .find_many(Selector::all())
            .sort_by(by_favourites)
            .select(&["username"]),
    )?;

    // bar, baz, foo
    print_usernames(
        "by favourites, then username",
        users
            .find_many(Selector::all())
            .sort_by(|a, b| by_favourites(a, b).then_with(|| by_username(a, b))),
    )?;

    // foo, bar, baz
    print_usernames(
        "by favourites descending, then username",
        users
            .find_many(Selector::all())
            .sort_by(|a, b| by_favourites(b, a).then_with(|| by_username(a, b))),
    )?;

    db.drop(false);
    Ok(())
}
