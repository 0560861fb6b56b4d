//! `skb` -- Markdown-mirrored knowledge base CLI.
//!
//! Parses CLI arguments with clap, resolves the runtime context, and
//! dispatches to command handlers. Exit codes: 0 success, 2 invalid
//! arguments (clap), 3 not found, 5 validation/conflict, 6 internal.

mod cli;
mod commands;
mod context;
mod output;

use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;

use cli::{Cli, Commands};
use context::RuntimeContext;
use shirokuma_repo::{ErrorKind, RepoError};

/// Cancellation flag for long scans (rebuild, export), set by Ctrl+C.
static CANCEL: AtomicBool = AtomicBool::new(false);

/// The flag long-running commands poll at directory boundaries.
pub(crate) fn cancel_flag() -> &'static AtomicBool {
    &CANCEL
}

fn main() {
    // First Ctrl+C requests cancellation; the second forces exit.
    let _ = ctrlc::set_handler(|| {
        if CANCEL.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
    });

    let cli = Cli::parse();

    let ctx = match RuntimeContext::from_global_args(&cli.global) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(6);
        }
    };

    if ctx.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("skb=debug,shirokuma_repo=debug,shirokuma_storage=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match cli.command {
        Commands::Create(args) => commands::create::run(&ctx, &args),
        Commands::Get(args) => commands::get::run(&ctx, &args),
        Commands::List(args) => commands::list::run(&ctx, &args),
        Commands::Update(args) => commands::update::run(&ctx, &args),
        Commands::Delete(args) => commands::delete::run(&ctx, &args),
        Commands::MoveType(args) => commands::move_type::run(&ctx, &args),
        Commands::Search(args) => commands::search::run(&ctx, &args),
        Commands::Tags(args) => commands::tags_cmd::run(&ctx, &args),
        Commands::Types(args) => commands::types_cmd::run(&ctx, &args),
        Commands::Stats => commands::stats::run(&ctx),
        Commands::State(args) => commands::state_cmd::run(&ctx, &args),
        Commands::Serve => commands::serve::run(&ctx),
        Commands::Export(args) => commands::export::run(&ctx, &args),
        Commands::Import(args) => commands::import::run(&ctx, &args),
        Commands::Rebuild(args) => commands::rebuild::run(&ctx, &args),
        Commands::Config => commands::config_cmd::run(&ctx),
        Commands::Completion(args) => commands::completion::run(&args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code_for(&e));
    }
}

/// Maps an error to the documented exit codes.
fn exit_code_for(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<RepoError>().map(RepoError::kind) {
        Some(ErrorKind::NotFound) => 3,
        Some(ErrorKind::Validation | ErrorKind::Conflict | ErrorKind::Reference) => 5,
        Some(ErrorKind::Integrity | ErrorKind::Internal) => 6,
        None => 6,
    }
}
