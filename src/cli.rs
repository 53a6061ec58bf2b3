//! Startup flags for the GraphQL server binary. `CONFIG` (env-sourced,
//! see `config.rs`) remains the source of truth for everything else;
//! these two flags exist only because operators commonly want to override
//! bind address/database target without touching the environment.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(long_about = "Daily child-transport route planning service", propagate_version = true, version)]
pub struct Args {
    /// Overrides BIND_ADDR from the environment.
    #[arg(long)]
    pub bind_addr: Option<String>,

    /// Overrides DATABASE_URL from the environment.
    #[arg(long)]
    pub database_url: Option<String>,
}
