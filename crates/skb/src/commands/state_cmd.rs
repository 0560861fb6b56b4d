//! `skb state` -- read or update the current-state document.

use std::io::Read;

use anyhow::Result;

use shirokuma_core::state::StateMetadata;
use shirokuma_repo::StateUpdate;

use crate::cli::{StateArgs, StateCommands};
use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: &StateArgs) -> Result<()> {
    let repo = ctx.open_repo()?;
    match &args.command {
        StateCommands::Show => {
            let view = repo.get_current_state()?;
            if ctx.json() {
                output_json(&view);
            } else {
                if let Some(at) = view.metadata.updated_at {
                    println!("Updated: {}", at.to_rfc3339());
                }
                if !view.metadata.tags.is_empty() {
                    println!("Tags: {}", view.metadata.tags.join(", "));
                }
                if !view.metadata.related.is_empty() {
                    println!("Related: {}", view.metadata.related.join(", "));
                }
                println!("{}", view.content);
            }
        }
        StateCommands::Update {
            content,
            tags,
            related,
            updated_by,
        } => {
            let content = if content == "-" {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                content.clone()
            };
            let metadata = updated_by.as_ref().map(|by| StateMetadata {
                updated_by: Some(by.clone()),
                ..Default::default()
            });
            let view = repo.update_current_state(StateUpdate {
                content,
                tags: (!tags.is_empty()).then(|| tags.clone()),
                related: (!related.is_empty()).then(|| related.clone()),
                metadata,
            })?;
            if ctx.json() {
                output_json(&view);
            } else if !ctx.quiet {
                println!("State updated");
            }
        }
    }
    Ok(())
}
