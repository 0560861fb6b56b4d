//! `skb import` -- load items from a Markdown tree or JSONL dump.

use anyhow::Result;

use shirokuma_repo::ImportOptions;

use crate::cli::ImportArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: &ImportArgs) -> Result<()> {
    let repo = ctx.open_repo()?;
    let report = repo.import(
        &args.source,
        ImportOptions {
            preserve_ids: args.preserve_ids,
            clear: args.clear,
        },
    )?;
    if ctx.json() {
        output_json(&report);
    } else {
        if !ctx.quiet {
            println!("Imported {} items", report.imported);
        }
        for skipped in &report.skipped {
            eprintln!("skipped: {skipped}");
        }
    }
    Ok(())
}
