//! CLI for the sqlretry transient-fault retry wrapper.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use sqlretry_core::config::{self, CatalogName, SqlRetryConfig};
use std::path::PathBuf;

use commands::{
    run_classify, run_codes, run_completions, run_config, run_delays, run_exec, run_query,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sqlretry")]
#[command(about = "sqlretry: retry database calls on transient faults", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/sqlretry/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log filter directives (e.g. "debug"); overrides RUST_LOG.
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Built-in transient-code tables, as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CatalogArg {
    SqlServer,
    Sqlite,
    None,
}

impl From<CatalogArg> for CatalogName {
    fn from(arg: CatalogArg) -> Self {
        match arg {
            CatalogArg::SqlServer => CatalogName::SqlServer,
            CatalogArg::Sqlite => CatalogName::Sqlite,
            CatalogArg::None => CatalogName::None,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// List the error codes treated as transient.
    Codes {
        /// Built-in table to list (default: the configured one, with extras).
        #[arg(long, value_enum)]
        catalog: Option<CatalogArg>,
    },

    /// Report whether a vendor error code would be retried.
    Classify {
        /// Numeric error code (may be negative, e.g. -2).
        #[arg(allow_negative_numbers = true)]
        code: i32,

        /// Built-in table to check against (default: the configured one, with extras).
        #[arg(long, value_enum)]
        catalog: Option<CatalogArg>,
    },

    /// Print the backoff schedule of the configured policy.
    Delays,

    /// Run SQL statements in one transaction against a SQLite file with retry;
    /// print rows affected.
    Exec {
        /// SQLite database file (created if missing).
        #[arg(long, value_name = "PATH")]
        db: PathBuf,

        /// Statement to run.
        sql: String,
    },

    /// Run a SQL query against a SQLite file with retry; print the rows.
    Query {
        /// SQLite database file (created if missing).
        #[arg(long, value_name = "PATH")]
        db: PathBuf,

        /// Query to run.
        sql: String,
    },

    /// Print the effective configuration.
    Config,

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    fn load_config(&self) -> Result<SqlRetryConfig> {
        match &self.config {
            Some(path) => config::load_from_path(path),
            None => config::load_or_init(),
        }
    }

    pub async fn run(self) -> Result<()> {
        if let CliCommand::Completions { shell } = self.command {
            run_completions(shell);
            return Ok(());
        }

        let cfg = self.load_config()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match self.command {
            CliCommand::Codes { catalog } => run_codes(&cfg, catalog.map(Into::into)),
            CliCommand::Classify { code, catalog } => {
                run_classify(&cfg, code, catalog.map(Into::into))
            }
            CliCommand::Delays => run_delays(&cfg)?,
            CliCommand::Exec { db, sql } => run_exec(&cfg, &db, &sql).await?,
            CliCommand::Query { db, sql } => run_query(&cfg, &db, &sql).await?,
            CliCommand::Config => run_config(&cfg, self.config.as_deref())?,
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
