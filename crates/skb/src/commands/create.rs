//! `skb create` -- create a new item.

use anyhow::Result;

use shirokuma_repo::CreateItem;

use crate::cli::CreateArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: &CreateArgs) -> Result<()> {
    let repo = ctx.open_repo()?;
    let input = CreateItem {
        type_name: args.type_name.clone(),
        title: args.title.clone(),
        description: args.description.clone(),
        content: args.content.clone(),
        status: args.status.clone(),
        priority: args.priority.clone(),
        tags: args.tags.clone(),
        related: args.related.clone(),
        start_date: args.start_date.clone(),
        end_date: args.end_date.clone(),
        category: args.category.clone(),
        version: args.version.clone(),
        date: args.date.clone(),
        datetime: args.datetime.clone(),
        ..Default::default()
    };

    let detail = repo.create_item(input)?;
    if ctx.json() {
        output_json(&detail);
    } else if !ctx.quiet {
        println!(
            "Created {}-{}: {}",
            detail.item.type_name, detail.item.id, detail.item.title
        );
    }
    Ok(())
}
