//! FileDB hello world
//!
//! Creates a `users` collection, then walks through insert, find, update and
//! delete, printing the collection along the way.

use clap::Parser;
use filedb_core::{Config, Database, Selector};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Walk through the basic FileDB operations.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the collection files
    #[arg(short, long, default_value = "./data")]
    root: PathBuf,

    /// Persist every change immediately
    #[arg(short, long, default_value_t = true, action = clap::ArgAction::Set)]
    autosave: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let db = Database::open(Config::new().root_dir(&cli.root).autosave(cli.autosave))?;
    // Start from a clean root; a missing root is fine.
    db.drop(true);

    let users = db.collection("users")?;

    users.insert_one(&json!({
        "firstName": "fancy",
        "lastName": "foo",
        "favourites": ["🍎 Apple", "🍐 Pear"],
    }))?;

    if !cli.autosave {
        db.save()?;
    }

    users.insert_many(vec![
        json!({ "firstName": "betty", "lastName": "bar" }),
        json!({ "firstName": "benson", "lastName": "baz" }),
    ])?;

    let all = users.find_many(Selector::all()).value();
    println!("{}", serde_json::to_string_pretty(&all)?);

    if let Some(fancy) = users.find_one(json!({ "firstName": "fancy" })) {
        println!("{}", serde_json::to_string_pretty(&fancy)?);
    }

    users.update_one(json!({ "firstName": "fancy" }), json!({ "lastName": "bar" }))?;
    let updated = users.update_many(
        json!({ "favourites": null }),
        json!({ "favourites": ["🍌 Banana"] }),
    )?;
    info!(count = updated.len(), "gave bananas to users without favourites");

    users.delete_one(json!({ "firstName": "fancy" }))?;
    let removed = users.delete_many(Selector::all())?;
    info!(count = removed.len(), "deleted remaining users");

    if !cli.autosave {
        db.save()?;
    }

    Ok(())
}
