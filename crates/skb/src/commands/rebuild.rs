//! `skb rebuild` -- reconstruct the index from the Markdown tree.

use anyhow::Result;

use crate::cli::RebuildArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: &RebuildArgs) -> Result<()> {
    let repo = ctx.open_repo()?;

    if args.reproject {
        let written = repo.reproject()?;
        if ctx.json() {
            output_json(&serde_json::json!({"reprojected": written}));
        } else if !ctx.quiet {
            println!("Re-projected {written} missing files");
        }
        return Ok(());
    }

    let report = repo.rebuild(crate::cancel_flag())?;
    if ctx.json() {
        output_json(&report);
        return Ok(());
    }
    if !ctx.quiet {
        for (type_name, count) in &report.counts {
            println!("{type_name}: {count} items");
        }
        for (type_name, value) in &report.sequences {
            println!("sequence {type_name} = {value}");
        }
    }
    for skipped in &report.skipped {
        eprintln!("skipped {}: {}", skipped.path.display(), skipped.reason);
    }
    Ok(())
}
