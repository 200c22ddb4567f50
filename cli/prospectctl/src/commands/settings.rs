//! Config commands (saved default source).

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use url::Url;

use crate::config::Config;
use crate::output::{print_single, print_success, OutputFormat};

use super::CommandContext;

/// Manage the saved default ID source.
#[derive(Debug, Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Debug, Subcommand)]
enum ConfigSubcommand {
    /// Show the saved configuration.
    Show,

    /// Save a default ID file.
    SetSource {
        /// File of issued IDs, one per line.
        path: PathBuf,
    },

    /// Save a default database URL.
    SetDatabaseUrl {
        /// Postgres connection URL.
        url: String,

        /// Table holding issued IDs.
        #[arg(long)]
        table: Option<String>,
    },

    /// Clear the saved configuration.
    Clear,
}

#[derive(Debug, Serialize)]
struct ConfigView {
    path: String,
    source: Option<String>,
    database_url: Option<String>,
    table: Option<String>,
}

impl ConfigCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            ConfigSubcommand::Show => show(ctx),
            ConfigSubcommand::SetSource { path } => {
                let path = std::path::absolute(&path).unwrap_or(path);
                save(ctx, |config| {
                    config.source = Some(path);
                })
            }
            ConfigSubcommand::SetDatabaseUrl { url, table } => save(ctx, |config| {
                config.database_url = Some(url);
                if table.is_some() {
                    config.table = table;
                }
            }),
            ConfigSubcommand::Clear => save(ctx, |config| *config = Config::default()),
        }
    }
}

fn show(ctx: CommandContext) -> Result<()> {
    let view = ConfigView {
        path: Config::path()?.display().to_string(),
        source: ctx.config.source.map(|p| p.display().to_string()),
        database_url: ctx.config.database_url.as_deref().map(redact_url),
        table: ctx.config.table,
    };

    match ctx.format {
        OutputFormat::Json => print_single(&view),
        OutputFormat::Table => {
            println!("config: {}", view.path);
            println!("source: {}", view.source.as_deref().unwrap_or("-"));
            println!("database_url: {}", view.database_url.as_deref().unwrap_or("-"));
            println!("table: {}", view.table.as_deref().unwrap_or("-"));
        }
    }

    Ok(())
}

/// Masks the password of a connection URL. URLs without an authority part
/// are masked entirely.
fn redact_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return "****".to_string();
    };
    if url.cannot_be_a_base() {
        return "****".to_string();
    }
    if url.password().is_some() && url.set_password(Some("****")).is_err() {
        return "****".to_string();
    }
    url.to_string()
}

fn save(mut ctx: CommandContext, update: impl FnOnce(&mut Config)) -> Result<()> {
    update(&mut ctx.config);
    ctx.config.save()?;

    match ctx.format {
        OutputFormat::Json => print_single(&serde_json::json!({ "ok": true })),
        OutputFormat::Table => print_success("Saved configuration"),
    }

    Ok(())
}
