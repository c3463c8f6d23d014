//! CLI entry point for dirlist

use std::path::PathBuf;
use std::process;

use clap::Parser;
use dirlist::{Config, ListError, ListingSession};

#[derive(Parser, Debug)]
#[command(name = "dirlist")]
#[command(about = "Recursive directory lister with per-subtree output files")]
#[command(version)]
struct Args {
    /// Path to the JSON listing configuration
    config: Option<PathBuf>,

    /// Listing name, appended to the generated output directory name
    #[arg(default_value = "")]
    listing_name: String,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let Some(config_path) = args.config else {
        eprintln!("ERROR: no config specified");
        process::exit(1);
    };

    if !config_path.is_file() {
        eprintln!(
            "ERROR: config file \"{}\" does not exist",
            config_path.display()
        );
        process::exit(1);
    }

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("CONFIG ERROR: {}", e);
            process::exit(1);
        }
    };

    let mut session = match ListingSession::new(config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("CONFIG ERROR: {}", e);
            process::exit(1);
        }
    };

    // A whitespace-only listing name means no name at all.
    let listing_name = if args.listing_name.trim().is_empty() {
        ""
    } else {
        args.listing_name.as_str()
    };

    if let Err(e) = session.run(listing_name) {
        match e {
            ListError::InvalidListingName => {
                eprintln!("ERROR: Listing name contains invalid characters")
            }
            other => eprintln!("LISTING PREP ERROR: {}", other),
        }
        process::exit(1);
    }
}
