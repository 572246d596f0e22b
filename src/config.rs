//! Command line and environment configuration.

use anyhow::anyhow;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::store::Role;

pub const DATABASE_ENV: &str = "SCHOOLREC_DATABASE";

/// School records: students, subjects and their results.
#[derive(Parser, Debug)]
#[command(name = "schoolrec", version, about, long_about = None)]
pub struct Cli {
    /// SQLite database file
    #[arg(short, long, global = true, env = DATABASE_ENV)]
    pub database: Option<PathBuf>,

    /// Runs the interactive shell when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and use the role menu
    Shell,
    /// Create the schema if it does not exist yet
    Init,
    /// Register a teacher or parent account
    AddUser(AddUserArgs),
    /// Register a student
    AddStudent(AddStudentArgs),
    /// Register a subject taught by an existing teacher
    AddSubject(AddSubjectArgs),
    /// Load the demo dataset
    Seed(SeedArgs),
    /// Print a view without logging in
    Report(ReportArgs),
}

#[derive(Args, Debug)]
pub struct AddUserArgs {
    #[arg(long)]
    pub username: String,
    /// Read from standard input when omitted
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub role: Role,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub full_name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(Args, Debug)]
pub struct AddStudentArgs {
    #[arg(long)]
    pub id_number: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub date_of_birth: Option<NaiveDate>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
}

#[derive(Args, Debug)]
pub struct AddSubjectArgs {
    #[arg(long)]
    pub name: String,
    /// Username of the teaching teacher
    #[arg(long)]
    pub teacher: String,
    #[arg(long)]
    pub total_points: i64,
    /// YYYY-MM-DD
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Also register this many random results
    #[arg(long, default_value_t = 0)]
    pub results: usize,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(subcommand)]
    pub view: ReportView,

    /// Emit JSON instead of a table
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ReportView {
    /// All students, best average first
    Rank,
    /// One student's results
    Results {
        id_number: String,
        #[arg(long)]
        subject: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: PathBuf,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let database = cli
            .database
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| {
                anyhow!("no database configured: pass --database or set {DATABASE_ENV}")
            })?;
        Ok(Self { database })
    }
}
