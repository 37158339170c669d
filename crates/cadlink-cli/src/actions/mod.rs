//! Action handling module
//!
//! Each command runs inside its own host session, so the connection is
//! released whether the command succeeds or fails.

mod file;

use cadlink_core::CadlinkConfig;
use cadlink_host::Application;

use crate::cli::Command;

pub use file::{handle_export, handle_import, handle_info, handle_new};

/// Context for action handlers
pub struct ActionContext<'a> {
    pub application: &'a dyn Application,
    pub config: &'a CadlinkConfig,
}

impl<'a> ActionContext<'a> {
    pub fn new(application: &'a dyn Application, config: &'a CadlinkConfig) -> Self {
        Self {
            application,
            config,
        }
    }
}

/// Dispatch a command to the appropriate handler
pub fn dispatch_action(command: Command, ctx: &ActionContext) -> anyhow::Result<()> {
    match command {
        Command::Import {
            document,
            csv,
            unit,
            delimiter,
            new,
            save_as,
        } => {
            let document = ctx.config.resolve_document_path(document);
            let save_as = save_as.map(|p| ctx.config.resolve_document_path(p));
            let report = handle_import(ctx, &document, &csv, unit, delimiter, new, save_as)?;
            for line in report.failures {
                eprintln!("{line}");
            }
            println!("{}", report.summary);
        }
        Command::Export {
            document,
            csv,
            unit,
            delimiter,
            no_header,
        } => {
            let document = ctx.config.resolve_document_path(document);
            let rows = handle_export(ctx, &document, &csv, unit, delimiter, no_header)?;
            println!("Exported {} points to {}", rows, csv.display());
        }
        Command::Info { document } => {
            let document = ctx.config.resolve_document_path(document);
            let info = handle_info(ctx, &document)?;
            println!("{info}");
        }
        Command::New { document, kind } => {
            let document = ctx.config.resolve_document_path(document);
            handle_new(ctx, &document, kind)?;
            println!("Created {} document {}", kind.name(), document.display());
        }
    }
    Ok(())
}
