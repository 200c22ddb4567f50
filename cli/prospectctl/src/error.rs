//! Error handling and display for the CLI.

use colored::Colorize;
use prospect_id::IdError;
use prospect_source::SourceError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("No ID source configured.")]
    NoSource,

    #[error("Source {0} cannot be written; --write needs a file source.")]
    NotWritable(String),

    #[error(transparent)]
    Id(#[from] IdError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    let Some(cli_err) = err.downcast_ref::<CliError>() else {
        return;
    };

    match cli_err {
        CliError::NoSource => {
            eprintln!(
                "\n{}",
                "Hint: Pass --source <file> or --database-url <url>, or run `pid config set-source <file>`."
                    .yellow()
            );
        }
        CliError::NotWritable(_) => {
            eprintln!(
                "\n{}",
                "Hint: Persist IDs minted from a database source with your own workflow.".yellow()
            );
        }
        CliError::Id(e) if e.is_validation_error() => {
            eprintln!(
                "\n{}",
                "Hint: IDs are 5-digit area code + 3-digit family + 1 letter, e.g. 01001002B."
                    .yellow()
            );
        }
        CliError::Id(IdError::LetterExhausted { .. }) => {
            eprintln!(
                "\n{}",
                "Hint: Start a new family with `pid next-family <area>`.".yellow()
            );
        }
        CliError::Source(e) if e.is_database_error() => {
            eprintln!(
                "\n{}",
                "Hint: Check the database URL and that the table is reachable.".yellow()
            );
        }
        _ => {}
    }
}
