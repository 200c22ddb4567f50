//! Check command (validity and novelty of a single ID).

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::output::{print_single, OutputFormat};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Prospect ID to check (e.g. 01001002B).
    id: String,
}

#[derive(Debug, Serialize)]
struct CheckView {
    id: String,
    valid: bool,
    novel: bool,
}

pub async fn run(ctx: CommandContext, args: CheckArgs) -> Result<()> {
    let loaded = ctx.load().await?;
    let view = CheckView {
        valid: prospect_id::is_valid(&args.id),
        novel: loaded.registry.is_novel(&args.id),
        id: args.id,
    };

    match ctx.format {
        OutputFormat::Json => print_single(&view),
        OutputFormat::Table => {
            let status = match (view.valid, view.novel) {
                (false, _) => "invalid".red(),
                (true, true) => "available".green(),
                (true, false) => "taken".yellow(),
            };
            println!("{}: {}", view.id, status);
        }
    }

    Ok(())
}
