//! `skb search` -- full-text search, suggestions and tag lookup.

use anyhow::Result;

use shirokuma_core::filter::SearchPage;

use crate::cli::{SearchArgs, SearchCommands};
use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: &SearchArgs) -> Result<()> {
    let repo = ctx.open_repo()?;
    match &args.command {
        SearchCommands::Items(a) => {
            let page = SearchPage::new(a.limit, a.offset);
            let hits = repo.search_items(&a.query, &a.types, page)?;
            if ctx.json() {
                output_json(&hits);
            } else if hits.is_empty() {
                println!("No matches");
            } else {
                for hit in &hits {
                    println!(
                        "{}-{}  {}  (score {:.2})",
                        hit.item.type_name, hit.item.id, hit.item.title, hit.score
                    );
                }
            }
        }
        SearchCommands::Suggest(a) => {
            let suggestions = repo.search_suggest(&a.query, &a.types, a.limit)?;
            if ctx.json() {
                output_json(&suggestions);
            } else {
                for s in &suggestions {
                    println!("{s}");
                }
            }
        }
        SearchCommands::Tag(a) => {
            let results = repo.search_items_by_tag(&a.tag, &a.types)?;
            if ctx.json() {
                output_json(&results);
            } else {
                for (type_name, items) in results.tasks.iter().chain(results.documents.iter()) {
                    for item in items {
                        println!("{}-{}  {}", type_name, item.id, item.title);
                    }
                }
            }
        }
    }
    Ok(())
}
