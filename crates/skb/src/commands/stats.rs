//! `skb stats` -- counts per type, status and tag.

use anyhow::Result;
use serde::Serialize;

use crate::context::RuntimeContext;
use crate::output::output_json;
use shirokuma_ui::Table;

#[derive(Debug, Serialize)]
struct Stats {
    by_type: Vec<(String, i64)>,
    by_status: Vec<(String, i64)>,
    tag_count: i64,
}

pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let repo = ctx.open_repo()?;
    let stats = Stats {
        by_type: repo.store().stats_by_type().map_err(shirokuma_repo::RepoError::from)?,
        by_status: repo
            .store()
            .stats_by_status()
            .map_err(shirokuma_repo::RepoError::from)?,
        tag_count: repo.store().count_tags().map_err(shirokuma_repo::RepoError::from)?,
    };

    if ctx.json() {
        output_json(&stats);
        return Ok(());
    }

    let mut table = Table::new(&["TYPE", "COUNT"]);
    for (type_name, count) in &stats.by_type {
        table.push_row(vec![type_name.clone(), count.to_string()]);
    }
    print!("{}", table.render());

    let mut table = Table::new(&["STATUS", "COUNT"]);
    for (status, count) in &stats.by_status {
        table.push_row(vec![status.clone(), count.to_string()]);
    }
    println!();
    print!("{}", table.render());
    println!();
    println!("Tags: {}", stats.tag_count);
    Ok(())
}
