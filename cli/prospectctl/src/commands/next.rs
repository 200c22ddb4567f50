//! Allocation queries (next family, next letter).

use anyhow::Result;
use clap::Args;
use prospect_id::ProspectId;
use serde::Serialize;

use crate::error::CliError;
use crate::output::{print_single, OutputFormat};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct NextFamilyArgs {
    /// 5-digit area code.
    area_code: String,
}

#[derive(Debug, Args)]
pub struct NextLetterArgs {
    /// Full ID or 8-digit area code + family prefix.
    id_or_prefix: String,
}

#[derive(Debug, Serialize)]
struct NextView {
    next: String,
    id: ProspectId,
}

fn print_next(view: &NextView, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_single(view),
        OutputFormat::Table => println!("{} ({})", view.next, view.id),
    }
}

pub async fn next_family(ctx: CommandContext, args: NextFamilyArgs) -> Result<()> {
    let loaded = ctx.load().await?;
    let id = loaded
        .registry
        .next_new_family_id(&args.area_code)
        .map_err(CliError::from)?;

    print_next(
        &NextView {
            next: id.family().to_string(),
            id,
        },
        ctx.format,
    );
    Ok(())
}

pub async fn next_letter(ctx: CommandContext, args: NextLetterArgs) -> Result<()> {
    let loaded = ctx.load().await?;
    let id = loaded
        .registry
        .next_id_in_family(&args.id_or_prefix)
        .map_err(CliError::from)?;

    print_next(
        &NextView {
            next: id.letter().to_string(),
            id,
        },
        ctx.format,
    );
    Ok(())
}
