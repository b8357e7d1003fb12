use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use tasktree::cli::args::{Cli, Commands};
use tasktree::cli::commands;
use tasktree::config::{Config, Paths};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = Paths::new()?;
    let config = Config::load(&paths)?;
    let format = cli.output.unwrap_or(config.general.default_output);

    let output = match cli.command {
        Commands::Show => commands::show(&paths, format)?,
        Commands::Add { value, under } => commands::add(&paths, &value, under.as_deref(), format)?,
        Commands::Done { id } => commands::done(&paths, &id, format)?,
        Commands::Edit { id, value } => commands::edit(&paths, &id, &value, format)?,
        Commands::Move { id, to, top } => {
            commands::move_task(&paths, &id, to.as_deref(), top, format)?
        }
        Commands::Trash { id } => commands::trash(&paths, &id, format)?,
        Commands::EmptyTrash => commands::empty_trash(&paths, format)?,
        Commands::Set { setting, value } => commands::set(&paths, setting, value, format)?,
        Commands::Export { path } => commands::export(&paths, path, format)?,
        Commands::Import { path } => commands::import(&paths, &path, format)?,
        Commands::Sync { remote, user } => {
            commands::sync(&paths, &config, remote, user, format)?
        }
        Commands::Completions { shell } => commands::completions(shell),
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
