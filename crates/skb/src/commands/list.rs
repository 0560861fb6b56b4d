//! `skb list` -- list items of a type.

use anyhow::Result;

use shirokuma_core::filter::ListFilter;
use shirokuma_core::validation::parse_date_field;

use crate::cli::ListArgs;
use crate::context::RuntimeContext;
use crate::output::{items_table, output_json};

pub fn run(ctx: &RuntimeContext, args: &ListArgs) -> Result<()> {
    let repo = ctx.open_repo()?;
    let filter = ListFilter {
        statuses: args.statuses.clone(),
        include_closed_statuses: args.include_closed,
        start_date: match args.start_date.as_deref() {
            Some(s) => Some(parse_date_field(s).map_err(shirokuma_repo::RepoError::from)?),
            None => None,
        },
        end_date: match args.end_date.as_deref() {
            Some(s) => Some(parse_date_field(s).map_err(shirokuma_repo::RepoError::from)?),
            None => None,
        },
        tags: args.tags.clone(),
        limit: args.limit,
        offset: args.offset,
    };

    let items = repo.get_items(&args.type_name, &filter)?;
    if ctx.json() {
        output_json(&items);
        return Ok(());
    }

    if items.is_empty() {
        if !ctx.quiet {
            println!("No {} found", args.type_name);
        }
        return Ok(());
    }
    let closable: Vec<String> = repo
        .get_statuses()?
        .into_iter()
        .filter(|s| s.is_closable)
        .map(|s| s.name)
        .collect();
    print!("{}", items_table(&items, &closable));
    Ok(())
}
