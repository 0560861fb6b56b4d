//! `skb move-type` -- move an item to another type within the same base.

use anyhow::Result;

use crate::cli::MoveTypeArgs;
use crate::commands::parse_id;
use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: &MoveTypeArgs) -> Result<()> {
    let repo = ctx.open_repo()?;
    let result =
        repo.change_item_type(&args.from_type, &parse_id(&args.from_id), &args.to_type)?;
    if ctx.json() {
        output_json(&result);
    } else if !ctx.quiet {
        println!(
            "Moved {}-{} to {}-{} ({} references migrated)",
            args.from_type, args.from_id, args.to_type, result.new_id, result.migrated_references
        );
    }
    Ok(())
}
