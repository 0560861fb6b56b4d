//! `skb export` -- project all items into a timestamped directory.

use anyhow::Result;

use crate::cli::ExportArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: &ExportArgs) -> Result<()> {
    let repo = ctx.open_repo()?;
    let export_root = args
        .output
        .clone()
        .unwrap_or_else(|| ctx.config.export_dir.clone());
    let report = repo.export(&export_root, args.include_state, crate::cancel_flag())?;
    if ctx.json() {
        output_json(&report);
    } else if !ctx.quiet {
        println!("Exported {} files to {}", report.files, report.dir.display());
    }
    Ok(())
}
