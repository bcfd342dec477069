//! `spintimer export` and `spintimer import`.

use std::path::PathBuf;

use chrono::{Local, Utc};
use clap::Args;
use spintimer_core::transfer::export_file_name;
use spintimer_core::{export_json, import_json, Database, ExportedTraining};
use tracing::info;

use super::{find_set, read_input, CliResult};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Set id, id prefix, or exact name
    pub key: String,
    /// Output file or directory (stdout when omitted)
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON file in export format ("-" for stdin)
    pub path: PathBuf,
    /// Store the imported training as a saved set
    #[arg(long)]
    pub save: bool,
    /// Override the imported name
    #[arg(long)]
    pub name: Option<String>,
    /// Print the parsed training as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn export(args: ExportArgs) -> CliResult {
    let db = Database::open()?;
    let set = find_set(&db, &args.key)?;
    let training = ExportedTraining::from_sequence(
        set.name.clone(),
        set.description.clone(),
        &set.sequence()?,
        Utc::now(),
    );
    let payload = export_json(&training)?;

    match args.out {
        None => println!("{payload}"),
        Some(out) => {
            let path = if out.is_dir() {
                out.join(export_file_name(Local::now().date_naive()))
            } else {
                out
            };
            std::fs::write(&path, payload)?;
            info!(path = %path.display(), set = %set.id, "exported saved set");
            println!("exported to {}", path.display());
        }
    }
    Ok(())
}

pub fn import(args: ImportArgs) -> CliResult {
    let mut imported = import_json(&read_input(&args.path)?)?;
    if let Some(name) = args.name.filter(|n| !n.trim().is_empty()) {
        imported.name = name;
    }
    let sequence = imported.sequence()?;

    if args.json {
        let training = ExportedTraining::from_sequence(
            imported.name.clone(),
            imported.description.clone(),
            &sequence,
            Utc::now(),
        );
        println!("{}", export_json(&training)?);
    } else {
        println!(
            "imported '{}': {} intervals, {}",
            imported.name,
            sequence.len(),
            spintimer_core::format_clock(sequence.total_duration_secs())
        );
    }

    if args.save {
        let db = Database::open()?;
        let set = db.create_saved_set(&imported.name, imported.description.as_deref(), &sequence)?;
        println!("saved set created: {} ({})", set.name, set.id);
    }
    Ok(())
}
