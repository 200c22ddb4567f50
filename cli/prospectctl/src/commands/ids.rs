//! ID mutation commands (add, remove, mint).
//!
//! Batches are all-or-nothing: if any ID in a batch is rejected the loaded
//! registry is left as it was and nothing is written. With `--write` the ID
//! file is locked from load until persist, so concurrent writers take turns.

use anyhow::Result;
use clap::Args;
use prospect_id::{AreaCode, FamilyNumber, IdError, ProspectId, Registry};
use tracing::info;

use crate::error::CliError;
use crate::output::{print_receipt, Receipt, ReceiptNextStep};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct IdsArgs {
    /// Prospect IDs (e.g. 01001002B).
    #[arg(required = true)]
    ids: Vec<String>,

    /// Write the updated registry back to the ID file, holding its lock
    /// until the write is done.
    #[arg(long)]
    write: bool,
}

#[derive(Debug, Args)]
pub struct MintArgs {
    /// 5-digit area code.
    area_code: String,

    /// Existing 3-digit family to add a version to; omit to start a new
    /// family.
    #[arg(long)]
    family: Option<String>,

    /// Write the updated registry back to the ID file, holding its lock
    /// until the write is done.
    #[arg(long)]
    write: bool,
}

#[derive(Debug, Clone, Copy)]
enum BatchOp {
    Add,
    Remove,
}

/// Applies every ID in order, or none of them.
fn apply_batch(registry: &mut Registry, ids: &[String], op: BatchOp) -> Result<(), IdError> {
    let mut staged = registry.clone();
    for id in ids {
        match op {
            BatchOp::Add => staged.add(id)?,
            BatchOp::Remove => staged.remove(id)?,
        }
    }
    *registry = staged;
    Ok(())
}

/// Picks the next ID: the next version of `family` if given, otherwise the
/// first ID of the next free family.
fn next_mint(
    registry: &Registry,
    area_code: &str,
    family: Option<&str>,
) -> Result<ProspectId, IdError> {
    match family {
        Some(family) => {
            let prefix = format!(
                "{}{}",
                AreaCode::parse(area_code)?,
                FamilyNumber::parse(family)?
            );
            registry.next_id_in_family(&prefix)
        }
        None => registry.next_new_family_id(area_code),
    }
}

pub async fn add(ctx: CommandContext, args: IdsArgs) -> Result<()> {
    mutate(ctx, args, BatchOp::Add).await
}

pub async fn remove(ctx: CommandContext, args: IdsArgs) -> Result<()> {
    mutate(ctx, args, BatchOp::Remove).await
}

async fn mutate(ctx: CommandContext, args: IdsArgs, op: BatchOp) -> Result<()> {
    let _lock = match args.write {
        true => Some(ctx.lock_for_write().await?),
        false => None,
    };
    let mut loaded = ctx.load().await?;
    apply_batch(&mut loaded.registry, &args.ids, op).map_err(CliError::from)?;

    if args.write {
        ctx.persist(&loaded).await?;
    }

    let (kind, verb) = match op {
        BatchOp::Add => ("ids.add", "Registered"),
        BatchOp::Remove => ("ids.remove", "Retired"),
    };
    info!(kind, count = args.ids.len(), persisted = args.write, "batch applied");

    print_receipt(
        ctx.format,
        Receipt {
            message: format!("{} {}", verb, args.ids.join(", ")),
            kind,
            ids: args.ids,
            persisted: args.write,
            next: &[],
        },
    );
    Ok(())
}

pub async fn mint(ctx: CommandContext, args: MintArgs) -> Result<()> {
    let _lock = match args.write {
        true => Some(ctx.lock_for_write().await?),
        false => None,
    };
    let mut loaded = ctx.load().await?;
    let id = next_mint(&loaded.registry, &args.area_code, args.family.as_deref())
        .map_err(CliError::from)?;
    loaded.registry.add_id(id).map_err(CliError::from)?;

    if args.write {
        ctx.persist(&loaded).await?;
    }
    info!(%id, persisted = args.write, "minted prospect id");

    let next = [ReceiptNextStep {
        label: "Next version",
        cmd: format!("pid mint {} --family {}", id.area_code(), id.family()),
    }];
    print_receipt(
        ctx.format,
        Receipt {
            message: format!("Minted {id}"),
            kind: "ids.mint",
            ids: vec![id.to_string()],
            persisted: args.write,
            next: &next,
        },
    );
    Ok(())
}
