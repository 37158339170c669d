//! Command line definitions

use std::path::PathBuf;

use cadlink_core::Unit;
use cadlink_host::DocumentKind;
use clap::{Parser, Subcommand};

/// Drive CAD documents from the command line
#[derive(Debug, Parser)]
#[command(name = "cadlink", version, about)]
pub struct Cli {
    /// Configuration file (RON); defaults to ./cadlink.ron when present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Import CSV points into a part document
    Import {
        /// Target document
        document: PathBuf,
        /// CSV file with x,y,z rows
        csv: PathBuf,
        /// Unit of the CSV coordinates (mm, cm, m, km, in, mile)
        #[arg(short, long)]
        unit: Option<Unit>,
        /// Field delimiter
        #[arg(short, long)]
        delimiter: Option<char>,
        /// Create the document instead of opening it
        #[arg(long)]
        new: bool,
        /// Save to this path instead of the document path
        #[arg(long)]
        save_as: Option<PathBuf>,
    },

    /// Export the points of a document to CSV
    Export {
        /// Source document
        document: PathBuf,
        /// Output CSV file
        csv: PathBuf,
        /// Unit to write (defaults to millimeters)
        #[arg(short, long)]
        unit: Option<Unit>,
        /// Field delimiter
        #[arg(short, long)]
        delimiter: Option<char>,
        /// Omit the x,y,z header row
        #[arg(long)]
        no_header: bool,
    },

    /// Show a summary of a document
    Info {
        document: PathBuf,
    },

    /// Create an empty document
    New {
        document: PathBuf,
        /// Document kind (part, product, drawing)
        #[arg(short, long, default_value = "part")]
        kind: DocumentKind,
    },
}
