//! Command-line surface for `recipebox-cli`.

#![deny(clippy::all, clippy::pedantic)]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use recipebox::config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(
    name = "recipebox-cli",
    version,
    about = "Browse, write and rate recipes",
    long_about = None
)]
pub struct Cli {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "RECIPEBOX_CONFIG_FILE", value_name = "PATH", global = true)]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ConfigOverrides,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the credential
    Login(CredentialsArgs),
    /// Create an account (log in afterwards)
    Register(CredentialsArgs),
    /// Forget the stored credential
    Logout,
    /// Show the user id carried by the stored credential
    Whoami,
    /// Recipe browsing and authoring
    Recipes(RecipesArgs),
    /// Ratings for a recipe
    Ratings(RatingsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CredentialsArgs {
    #[arg(long)]
    pub email: String,

    /// Password from env; read from stdin when unset (no flag, to keep it
    /// out of shell history)
    #[arg(hide = true, long = "password-env", env = "RECIPEBOX_PASSWORD")]
    pub password_env: Option<String>,
}

#[derive(Parser, Debug)]
pub struct RecipesArgs {
    #[command(subcommand)]
    pub action: RecipesCmd,
}

#[derive(Subcommand, Debug)]
pub enum RecipesCmd {
    /// List all recipes, or only yours
    List {
        #[arg(long, default_value_t = false)]
        mine: bool,
        /// Case-insensitive title filter
        #[arg(long)]
        search: Option<String>,
    },
    /// Get a recipe by id
    Get { id: i64 },
    /// Create a recipe
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Repeat for each ingredient, in order
        #[arg(long = "ingredient", value_name = "TEXT")]
        ingredients: Vec<String>,
        #[arg(long)]
        instructions: String,
    },
    /// Change some fields of a recipe
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Replaces the whole ingredient list when given
        #[arg(long = "ingredient", value_name = "TEXT")]
        ingredients: Vec<String>,
        #[arg(long)]
        instructions: Option<String>,
    },
    /// Delete a recipe
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[derive(Parser, Debug)]
pub struct RatingsArgs {
    #[command(subcommand)]
    pub action: RatingsCmd,
}

#[derive(Subcommand, Debug)]
pub enum RatingsCmd {
    /// List a recipe's ratings with their summary
    List { recipe_id: i64 },
    /// Rate a recipe from 1 to 5 stars (replaces your previous rating)
    Rate { recipe_id: i64, stars: i64 },
    /// Remove your rating of a recipe
    Delete {
        recipe_id: i64,
        /// Skip the confirmation prompt
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}
