//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Quire static site generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: quire.toml, searched upward from cwd)
    #[arg(short = 'C', long, global = true, default_value = "quire.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the site into the output directory
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },
}

/// Build command arguments. Each flag overrides the matching config key.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Output directory path (relative to site root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Fail pages whose internal links resolve to nothing
    #[arg(long, conflicts_with = "lenient")]
    pub strict: bool,

    /// Keep unresolved internal links as written and warn
    #[arg(long)]
    pub lenient: bool,

    /// Exit successfully even if some documents failed
    #[arg(short = 'k', long)]
    pub keep_going: bool,

    /// Override site URL (e.g. for CI deployments to a subdirectory)
    #[arg(short = 'U', long = "site-url", value_hint = clap::ValueHint::Url)]
    pub site_url: Option<String>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_flags() {
        let cli = Cli::try_parse_from(["quire", "build", "--lenient", "-o", "public", "-k"]).unwrap();
        let Commands::Build { build_args } = cli.command;
        assert!(build_args.lenient);
        assert!(!build_args.strict);
        assert!(build_args.keep_going);
        assert_eq!(build_args.output, Some(PathBuf::from("public")));
        assert_eq!(cli.config, PathBuf::from("quire.toml"));
    }

    #[test]
    fn test_alias_and_conflict() {
        assert!(Cli::try_parse_from(["quire", "b"]).is_ok());
        assert!(Cli::try_parse_from(["quire", "build", "--strict", "--lenient"]).is_err());
    }
}
