//! Saved-set management commands for CLI.

use clap::Subcommand;
use spintimer_core::{format_clock, Config, Database};

use super::{find_set, resolve_sequence, CliResult, SequenceSource};
use crate::render;

#[derive(Subcommand)]
pub enum SetsAction {
    /// List saved sets, newest first
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one saved set with its timeline
    Show {
        /// Set id, id prefix, or exact name
        key: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save a new set
    Save {
        /// Set name (defaults to the name in --file)
        #[arg(long)]
        name: Option<String>,
        /// Optional description
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        source: SequenceSource,
    },
    /// Replace the intervals of a set
    Update {
        /// Set id, id prefix, or exact name
        key: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        source: SequenceSource,
    },
    /// Rename a set
    Rename {
        /// Set id, id prefix, or exact name
        key: String,
        /// New name
        name: String,
    },
    /// Delete a set
    Delete {
        /// Set id, id prefix, or exact name
        key: String,
    },
}

pub fn run(action: SetsAction) -> CliResult {
    let db = Database::open()?;
    let config = Config::load_or_default();

    match action {
        SetsAction::List { json } => {
            let sets = db.list_saved_sets()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sets)?);
            } else if sets.is_empty() {
                println!("no saved sets");
            } else {
                for set in sets {
                    let last_used = set
                        .last_used_at
                        .map(|t| t.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "never".into());
                    println!(
                        "{}  {:<24}  {:>2} intervals  {:>6}  created {}  used {}",
                        &set.id[..8.min(set.id.len())],
                        set.name,
                        set.intervals.len(),
                        format_clock(set.total_duration_secs),
                        set.created_at.format("%Y-%m-%d"),
                        last_used,
                    );
                }
            }
        }
        SetsAction::Show { key, json } => {
            let set = find_set(&db, &key)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&set)?);
            } else {
                println!("{} ({})", set.name, set.id);
                if let Some(desc) = &set.description {
                    println!("{desc}");
                }
                print!("{}", render::timeline(&set.sequence()?, config.display.color_output));
            }
        }
        SetsAction::Save {
            name,
            description,
            source,
        } => {
            if source.set.is_some() || source.is_empty() {
                return Err("save needs --file or --interval".into());
            }
            let resolved = resolve_sequence(&source, &db, &config.colors)?;
            let name = name
                .or(resolved.name)
                .filter(|n| !n.trim().is_empty())
                .ok_or("a set needs a name: pass --name")?;
            let description = description.or(resolved.description);
            let set = db.create_saved_set(&name, description.as_deref(), &resolved.sequence)?;
            println!("saved set created: {} ({})", set.name, set.id);
        }
        SetsAction::Update {
            key,
            name,
            description,
            source,
        } => {
            let existing = find_set(&db, &key)?;
            let sequence = if source.is_empty() {
                existing.sequence()?
            } else {
                resolve_sequence(&source, &db, &config.colors)?.sequence
            };
            let set = db.update_saved_set(
                &existing.id,
                name.as_deref().unwrap_or(&existing.name),
                description.as_deref().or(existing.description.as_deref()),
                &sequence,
            )?;
            println!(
                "saved set updated: {} ({} intervals, {})",
                set.name,
                set.intervals.len(),
                format_clock(set.total_duration_secs)
            );
        }
        SetsAction::Rename { key, name } => {
            if name.trim().is_empty() {
                return Err("name must not be empty".into());
            }
            let existing = find_set(&db, &key)?;
            let set = db.rename_saved_set(&existing.id, &name)?;
            println!("saved set renamed: {}", set.name);
        }
        SetsAction::Delete { key } => {
            let existing = find_set(&db, &key)?;
            db.delete_saved_set(&existing.id)?;
            println!("saved set deleted: {}", existing.name);
        }
    }
    Ok(())
}
