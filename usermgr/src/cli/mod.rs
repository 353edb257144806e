//! CLI module for usermgr
//!
//! Provides command-line interface for the user management server.

pub mod serve;

use clap::{Parser, Subcommand};

/// usermgr - User / profile CRUD server with an audit log
#[derive(Parser, Debug)]
#[command(name = "usermgr")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    USERMGR_HOST                Bind address (default: 0.0.0.0)
    USERMGR_PORT                Listen port (default: 3000)
    USERMGR_DATABASE_URL        Database URL (default: sqlite:data/usermgr.db)
    USERMGR_DB_MAX_CONNECTIONS  Connection pool size (default: 5)
    USERMGR_LOG_LEVEL           Log level (default: info)
    USERMGR_LOG_DIR             Directory for JSON log files (optional)
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(serve::ServeArgs),
}
