//! Output formatting helpers for the `skb` CLI.

use serde::Serialize;

use shirokuma_core::item::{ItemDetail, ListItem};
use shirokuma_ui::styles::{render_priority, render_status};
use shirokuma_ui::Table;

/// Prints a value as pretty JSON on stdout.
pub fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error: failed to serialize output: {e}"),
    }
}

/// Renders list-view items as a table.
pub fn items_table(items: &[ListItem], closable: &[String]) -> String {
    let mut table = Table::new(&["ID", "TITLE", "STATUS", "PRIORITY", "TAGS"]);
    for item in items {
        let is_closable = closable.contains(&item.status);
        table.push_row(vec![
            item.id.to_string(),
            item.title.clone(),
            render_status(&item.status, is_closable),
            render_priority(item.priority),
            item.tags.join(","),
        ]);
    }
    table.render()
}

/// Prints one item in the detailed multi-line text format.
pub fn print_detail(detail: &ItemDetail) {
    let item = &detail.item;
    println!("{}-{}: {}", item.type_name, item.id, item.title);
    println!("  Status:   {}", item.status);
    println!("  Priority: {}", render_priority(item.priority));
    if let Some(ref d) = item.description {
        println!("  Description: {d}");
    }
    if let Some(ref c) = item.category {
        println!("  Category: {c}");
    }
    if let Some(ref v) = item.version {
        println!("  Version: {v}");
    }
    if let Some(d) = item.start_date {
        println!("  Start: {d}");
    }
    if let Some(d) = item.end_date {
        println!("  End: {d}");
    }
    if !item.tags.is_empty() {
        println!("  Tags: {}", item.tags.join(", "));
    }
    if !detail.related_tasks.is_empty() {
        println!("  Related tasks: {}", detail.related_tasks.join(", "));
    }
    if !detail.related_documents.is_empty() {
        println!("  Related documents: {}", detail.related_documents.join(", "));
    }
    println!("  Created: {}", item.created_at.to_rfc3339());
    println!("  Updated: {}", item.updated_at.to_rfc3339());
    if let Some(ref content) = item.content {
        println!();
        println!("{content}");
    }
}
