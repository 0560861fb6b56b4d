//! `skb update` -- update item fields.

use anyhow::Result;

use shirokuma_repo::UpdateItem;

use crate::cli::UpdateArgs;
use crate::commands::parse_id;
use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: &UpdateArgs) -> Result<()> {
    let repo = ctx.open_repo()?;

    let tags = if args.clear_tags {
        Some(Vec::new())
    } else if args.tags.is_empty() {
        None
    } else {
        Some(args.tags.clone())
    };
    let related = if args.clear_related {
        Some(Vec::new())
    } else if args.related.is_empty() {
        None
    } else {
        Some(args.related.clone())
    };

    let patch = UpdateItem {
        title: args.title.clone(),
        description: args.description.clone(),
        content: args.content.clone(),
        status: args.status.clone(),
        priority: args.priority.clone(),
        tags,
        related,
        start_date: args.start_date.clone(),
        end_date: args.end_date.clone(),
        category: args.category.clone(),
        version: args.version.clone(),
        ..Default::default()
    };

    let detail = repo.update_item(&args.type_name, &parse_id(&args.id), patch)?;
    if ctx.json() {
        output_json(&detail);
    } else if !ctx.quiet {
        println!(
            "Updated {}-{}: {}",
            detail.item.type_name, detail.item.id, detail.item.title
        );
    }
    Ok(())
}
