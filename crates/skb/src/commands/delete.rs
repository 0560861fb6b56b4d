//! `skb delete` -- delete an item.

use anyhow::Result;

use crate::cli::DeleteArgs;
use crate::commands::parse_id;
use crate::context::RuntimeContext;

pub fn run(ctx: &RuntimeContext, args: &DeleteArgs) -> Result<()> {
    let repo = ctx.open_repo()?;
    repo.delete_item(&args.type_name, &parse_id(&args.id))?;
    if ctx.json() {
        println!(
            "{}",
            serde_json::json!(format!("{} with ID {} deleted", args.type_name, args.id))
        );
    } else if !ctx.quiet {
        println!("Deleted {}-{}", args.type_name, args.id);
    }
    Ok(())
}
