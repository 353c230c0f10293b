//! Quire - a static site generator for markdown and literate blogs.

mod cli;
mod compiler;
mod config;
mod core;
mod generator;
mod logger;
mod output;
mod pipeline;
mod site;
mod source;
mod template;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, build::build_site};
use config::SiteConfig;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { .. } => build(&config),
    }
}

fn build(config: &SiteConfig) -> Result<ExitCode> {
    log!("build"; "building {} into {}", config.get_root().display(), config.build.output.display());

    let report = build_site(config)?;
    report.log();

    if report.has_failures() && config.build.fail_on_errors {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
