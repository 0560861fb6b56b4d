//! `skb tags` -- manage tags.

use anyhow::Result;

use crate::cli::{TagsArgs, TagsCommands};
use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: &TagsArgs) -> Result<()> {
    let repo = ctx.open_repo()?;
    match &args.command {
        TagsCommands::List => {
            let tags = repo.store().list_tags().map_err(shirokuma_repo::RepoError::from)?;
            if ctx.json() {
                output_json(&tags);
            } else {
                for tag in &tags {
                    println!("{}", tag.name);
                }
            }
        }
        TagsCommands::Create { name } => {
            let tag = repo.create_tag(name)?;
            if ctx.json() {
                output_json(&tag);
            } else if !ctx.quiet {
                println!("Created tag \"{}\"", tag.name);
            }
        }
        TagsCommands::Delete { name } => {
            let affected = repo.delete_tag(name)?;
            if ctx.json() {
                output_json(&serde_json::json!({"deleted": name, "items": affected}));
            } else if !ctx.quiet {
                println!("Deleted tag \"{name}\" from {affected} items");
            }
        }
        TagsCommands::Search { pattern } => {
            let tags = repo
                .store()
                .search_tags(pattern)
                .map_err(shirokuma_repo::RepoError::from)?;
            if ctx.json() {
                output_json(&tags);
            } else {
                for tag in &tags {
                    println!("{}", tag.name);
                }
            }
        }
    }
    Ok(())
}
