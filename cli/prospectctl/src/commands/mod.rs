//! CLI commands.

mod check;
mod ids;
mod list;
mod next;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use prospect_id::Registry;
use prospect_source::{load_registry, DbConfig, FileLock, FileSource, IdSource, PgSource};
use tracing::debug;

use crate::config::Config;
use crate::error::CliError;
use crate::output::OutputFormat;

/// prospectctl - Allocate and inspect prospect IDs.
#[derive(Debug, Parser)]
#[command(name = "pid")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (table or json).
    #[arg(long, global = true, default_value = "table")]
    format: String,

    /// File of issued IDs, one per line.
    #[arg(long, global = true, env = "PROSPECT_SOURCE")]
    source: Option<PathBuf>,

    /// Postgres URL to read issued IDs from (used when no file is given).
    #[arg(long, global = true, env = "PROSPECT_DATABASE_URL")]
    database_url: Option<String>,

    /// Table holding issued IDs.
    #[arg(long, global = true, env = "PROSPECT_TABLE")]
    table: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check whether an ID is well-formed and unused.
    Check(check::CheckArgs),

    /// Show the next free family number in an area code.
    NextFamily(next::NextFamilyArgs),

    /// Show the next letter for a family.
    NextLetter(next::NextLetterArgs),

    /// Register issued IDs.
    Add(ids::IdsArgs),

    /// Retire IDs.
    Remove(ids::IdsArgs),

    /// Allocate and register the next ID.
    Mint(ids::MintArgs),

    /// List registered families.
    List(list::ListArgs),

    /// Show or change saved configuration.
    Config(settings::ConfigCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        let format = match self.format.as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Table,
        };

        let ctx = CommandContext {
            config: Config::load()?,
            format,
            flags: SourceFlags {
                source: self.source,
                database_url: self.database_url,
                table: self.table,
            },
        };

        match self.command {
            Commands::Check(args) => check::run(ctx, args).await,
            Commands::NextFamily(args) => next::next_family(ctx, args).await,
            Commands::NextLetter(args) => next::next_letter(ctx, args).await,
            Commands::Add(args) => ids::add(ctx, args).await,
            Commands::Remove(args) => ids::remove(ctx, args).await,
            Commands::Mint(args) => ids::mint(ctx, args).await,
            Commands::List(args) => list::run(ctx, args).await,
            Commands::Config(cmd) => cmd.run(ctx).await,
            Commands::Version => {
                println!("pid {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Source selection from flags or environment.
#[derive(Debug, Default)]
pub struct SourceFlags {
    pub source: Option<PathBuf>,
    pub database_url: Option<String>,
    pub table: Option<String>,
}

/// Where issued IDs are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    File(PathBuf),
    Database { url: String, table: Option<String> },
}

/// Picks the source: flags before saved config, files before databases.
pub fn resolve_source(flags: &SourceFlags, config: &Config) -> Result<SourceSpec, CliError> {
    let table = flags.table.clone().or_else(|| config.table.clone());

    if let Some(path) = &flags.source {
        return Ok(SourceSpec::File(path.clone()));
    }
    if let Some(url) = &flags.database_url {
        return Ok(SourceSpec::Database {
            url: url.clone(),
            table,
        });
    }
    if let Some(path) = &config.source {
        return Ok(SourceSpec::File(path.clone()));
    }
    if let Some(url) = &config.database_url {
        return Ok(SourceSpec::Database {
            url: url.clone(),
            table,
        });
    }
    Err(CliError::NoSource)
}

/// A registry together with the file it can be written back to.
pub struct Loaded {
    pub registry: Registry,
    pub file: Option<FileSource>,
    pub origin: String,
}

/// Shared command context.
pub struct CommandContext {
    pub config: Config,
    pub format: OutputFormat,
    pub flags: SourceFlags,
}

impl CommandContext {
    /// Fetch issued IDs from the resolved source and build the registry.
    pub async fn load(&self) -> Result<Loaded> {
        match resolve_source(&self.flags, &self.config)? {
            SourceSpec::File(path) => {
                let source = FileSource::new(path);
                let registry = load_registry(&source).await.map_err(CliError::from)?;
                Ok(Loaded {
                    registry,
                    origin: source.describe(),
                    file: Some(source),
                })
            }
            SourceSpec::Database { url, table } => {
                let mut db = DbConfig::from_env();
                db.database_url = url;
                if let Some(table) = table {
                    db.table = table;
                }
                let source = PgSource::connect(&db).await.map_err(CliError::from)?;
                let registry = load_registry(&source).await.map_err(CliError::from)?;
                Ok(Loaded {
                    registry,
                    origin: source.describe(),
                    file: None,
                })
            }
        }
    }

    /// Lock the file source for a load-mutate-persist cycle.
    ///
    /// Fails with `NotWritable` for database sources, before anything is
    /// loaded.
    pub async fn lock_for_write(&self) -> Result<FileLock> {
        match resolve_source(&self.flags, &self.config)? {
            SourceSpec::File(path) => {
                let lock = FileSource::new(path).lock().await.map_err(CliError::from)?;
                Ok(lock)
            }
            SourceSpec::Database { table, .. } => {
                let table = table.unwrap_or_else(|| DbConfig::from_env().table);
                Err(CliError::NotWritable(format!("postgres:{table}")).into())
            }
        }
    }

    /// Write the registry back to its file source.
    pub async fn persist(&self, loaded: &Loaded) -> Result<()> {
        let Some(file) = &loaded.file else {
            return Err(CliError::NotWritable(loaded.origin.clone()).into());
        };
        file.write_all(loaded.registry.iter())
            .await
            .map_err(CliError::from)?;
        debug!(origin = %loaded.origin, "registry persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(source: Option<&str>, database_url: Option<&str>) -> SourceFlags {
        SourceFlags {
            source: source.map(PathBuf::from),
            database_url: database_url.map(str::to_string),
            table: None,
        }
    }

    #[test]
    fn test_resolve_source_no_source() {
        let err = resolve_source(&flags(None, None), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::NoSource));
    }

    #[test]
    fn test_resolve_source_flags_win_over_config() {
        let config = Config {
            source: Some(PathBuf::from("saved.txt")),
            database_url: None,
            table: None,
        };
        assert_eq!(
            resolve_source(&flags(Some("flag.txt"), None), &config).unwrap(),
            SourceSpec::File(PathBuf::from("flag.txt"))
        );
        assert_eq!(
            resolve_source(&flags(None, Some("postgres://db/ids")), &config).unwrap(),
            SourceSpec::Database {
                url: "postgres://db/ids".to_string(),
                table: None
            }
        );
        assert_eq!(
            resolve_source(&flags(None, None), &config).unwrap(),
            SourceSpec::File(PathBuf::from("saved.txt"))
        );
    }

    #[test]
    fn test_resolve_source_config_table() {
        let config = Config {
            source: None,
            database_url: Some("postgres://db/ids".to_string()),
            table: Some("gis.boundaries".to_string()),
        };
        assert_eq!(
            resolve_source(&flags(None, None), &config).unwrap(),
            SourceSpec::Database {
                url: "postgres://db/ids".to_string(),
                table: Some("gis.boundaries".to_string())
            }
        );
    }

    fn context(flags: SourceFlags) -> CommandContext {
        CommandContext {
            config: Config::default(),
            format: OutputFormat::Table,
            flags,
        }
    }

    #[tokio::test]
    async fn test_lock_for_write_holds_file_lock() {
        use fs2::FileExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        let ctx = context(flags(path.to_str(), None));

        let lock = ctx.lock_for_write().await.unwrap();
        let other = std::fs::File::open(FileSource::new(&path).lock_path()).unwrap();
        assert!(other.try_lock_exclusive().is_err());

        drop(lock);
        assert!(other.try_lock_exclusive().is_ok());
    }

    #[tokio::test]
    async fn test_lock_for_write_rejects_database_source() {
        let ctx = context(flags(None, Some("postgres://db/ids")));
        let err = ctx.lock_for_write().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::NotWritable(_))
        ));
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from([
            "pid",
            "--format",
            "json",
            "--source",
            "ids.txt",
            "mint",
            "01001",
            "--write",
        ])
        .unwrap();
        assert_eq!(cli.format, "json");
        assert_eq!(cli.source, Some(PathBuf::from("ids.txt")));
        assert!(matches!(cli.command, Commands::Mint(_)));
    }
}
