mod auth;
mod calc;
mod config;
mod db;
mod report;
mod seed;
mod shell;
mod store;

use anyhow::Context;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use config::{Cli, Command, Config};
use store::{NewStudent, NewSubject, NewUser, StoreError};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // stdout belongs to the shell.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            let fatal = e
                .downcast_ref::<StoreError>()
                .map(StoreError::is_fatal)
                .unwrap_or(false);
            ExitCode::from(if fatal { 2 } else { 1 })
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = Config::from_cli(&cli)?;
    let mut conn = db::open_db(&cfg.database)?;
    tracing::info!(database = %cfg.database.display(), "connected");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => {
            let stdin = io::stdin();
            shell::Shell::new(&mut conn, stdin.lock(), &mut out)
                .run()
                .context("shell i/o failed")?;
        }
        Command::Init => {
            writeln!(out, "schema ready at {}", cfg.database.display())?;
            for table in ["users", "students", "subjects", "results"] {
                writeln!(out, "{table}: {}", db::table_row_count(&conn, table)?)?;
            }
        }
        Command::AddUser(args) => {
            let password = match args.password {
                Some(p) => p,
                None => read_password()?,
            };
            let id = store::create_user(
                &conn,
                &NewUser {
                    username: args.username.clone(),
                    password,
                    email: args.email,
                    role: args.role,
                    full_name: args.full_name,
                    phone_number: args.phone,
                },
            )?;
            writeln!(out, "created {} {} (id {id})", args.role, args.username)?;
        }
        Command::AddStudent(args) => {
            let id = store::create_student(
                &conn,
                &NewStudent {
                    id_number: args.id_number.clone(),
                    first_name: args.first_name,
                    last_name: args.last_name,
                    date_of_birth: args.date_of_birth,
                    email: args.email,
                    phone_number: args.phone,
                    address: args.address,
                },
            )?;
            writeln!(out, "created student {} (id {id})", args.id_number)?;
        }
        Command::AddSubject(args) => {
            let id = store::create_subject(
                &conn,
                &NewSubject {
                    name: args.name.clone(),
                    teacher_username: args.teacher,
                    start_date: args.start_date,
                    end_date: args.end_date,
                    total_points: args.total_points,
                },
            )?;
            writeln!(out, "created subject {} (id {id})", args.name)?;
        }
        Command::Seed(args) => {
            let dataset = seed::demo_dataset()?;
            let summary = seed::load(&conn, &dataset)?;
            writeln!(
                out,
                "seeded {} rows, skipped {} existing",
                summary.created, summary.skipped
            )?;
            if args.results > 0 {
                let n = seed::populate_results(&mut conn, args.results, &mut rand::thread_rng())?;
                writeln!(out, "registered {n} random results")?;
            }
        }
        Command::Report(args) => {
            report::run(&conn, &args.view, args.json, &mut out)?;
        }
    }

    out.flush()?;
    drop(out);
    db::close(conn)?;
    Ok(())
}

fn read_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
