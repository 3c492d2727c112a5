//! CLI module - Command-line interface for usergate
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

use crate::models::{GroupCode, StatusCode};

/// usergate - user account manager
#[derive(Parser)]
#[command(name = "usergate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a user
    #[command(alias = "a")]
    Add {
        login: String,

        password: String,

        /// Group code: admin or user
        #[arg(long, default_value = "user")]
        group: GroupCode,

        #[arg(long)]
        group_description: Option<String>,

        #[arg(long)]
        state_description: Option<String>,
    },

    /// Show a single user
    #[command(alias = "i")]
    Get {
        #[arg(long, conflicts_with = "login", required_unless_present = "login")]
        id: Option<i32>,

        #[arg(long)]
        login: Option<String>,

        /// Related records to load, e.g. `UserGroup,UserState`
        #[arg(long, default_value = "UserGroup,UserState")]
        include: String,

        /// Look the user up for a later write
        #[arg(long)]
        tracked: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List users
    #[command(alias = "ls", alias = "l")]
    List {
        #[arg(long, default_value = "0")]
        skip: u64,

        /// Defaults to `accounts.default_page_size`
        #[arg(long)]
        take: Option<u64>,

        #[arg(long, default_value = "UserGroup,UserState")]
        include: String,

        #[arg(long)]
        group: Option<GroupCode>,

        #[arg(long)]
        state: Option<StatusCode>,

        #[arg(long)]
        json: bool,
    },

    /// Block a user
    #[command(alias = "deactivate")]
    Block { id: i32 },

    /// Create default config file
    Init,
}

pub use commands::*;
