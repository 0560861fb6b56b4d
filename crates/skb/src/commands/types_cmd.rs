//! `skb types` -- manage item types.

use anyhow::{Result, bail};

use shirokuma_core::enums::BaseType;

use crate::cli::{TypesArgs, TypesCommands};
use crate::context::RuntimeContext;
use crate::output::output_json;
use shirokuma_ui::Table;

pub fn run(ctx: &RuntimeContext, args: &TypesArgs) -> Result<()> {
    let repo = ctx.open_repo()?;
    match &args.command {
        TypesCommands::List { definitions } => {
            let types = repo.get_types(*definitions)?;
            if ctx.json() {
                output_json(&types);
            } else {
                let mut table = Table::new(&["NAME", "BASE", "RESERVED", "DESCRIPTION"]);
                for t in &types {
                    table.push_row(vec![
                        t.def.name.clone(),
                        t.def.base_type.to_string(),
                        if t.def.is_reserved { "yes" } else { "" }.to_owned(),
                        t.def.description.clone().unwrap_or_default(),
                    ]);
                }
                print!("{}", table.render());
            }
        }
        TypesCommands::Create {
            name,
            base_type,
            description,
        } => {
            let Some(base) = BaseType::parse(base_type) else {
                bail!("invalid base_type {base_type:?} (expected \"tasks\" or \"documents\")");
            };
            let def = repo.create_type(name, base, description.as_deref())?;
            if ctx.json() {
                output_json(&def);
            } else if !ctx.quiet {
                println!("Created type \"{}\" ({})", def.name, def.base_type);
            }
        }
        TypesCommands::Update { name, description } => {
            let def = repo.update_type(name, description)?;
            if ctx.json() {
                output_json(&def);
            } else if !ctx.quiet {
                println!("Updated type \"{}\"", def.name);
            }
        }
        TypesCommands::Delete { name } => {
            repo.delete_type(name)?;
            if !ctx.quiet {
                println!("Deleted type \"{name}\"");
            }
        }
    }
    Ok(())
}
