//! `skb get` -- show one item in full.

use anyhow::Result;

use crate::cli::GetArgs;
use crate::commands::parse_id;
use crate::context::RuntimeContext;
use crate::output::{output_json, print_detail};

pub fn run(ctx: &RuntimeContext, args: &GetArgs) -> Result<()> {
    let repo = ctx.open_repo()?;
    let detail = repo.get_item_detail(&args.type_name, &parse_id(&args.id))?;
    if ctx.json() {
        output_json(&detail);
    } else {
        print_detail(&detail);
    }
    Ok(())
}
