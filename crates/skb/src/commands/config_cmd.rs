//! `skb config` -- print the resolved configuration.

use anyhow::Result;

use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext) -> Result<()> {
    if ctx.json() {
        output_json(&ctx.config);
    } else {
        println!("data_dir:   {}", ctx.config.data_dir.display());
        println!("export_dir: {}", ctx.config.export_dir.display());
        println!("env:        {}", ctx.config.env);
    }
    Ok(())
}
