mod commands;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::serve::ServeArgs;

#[derive(Parser)]
#[command(name = "mvw")]
#[command(version, about = "Minimal viable wiki: a folder of notes served as a site", long_about = None)]
struct Cli {
    /// Run as if started in this directory
    #[arg(short = 'C', long = "directory", global = true, default_value = ".")]
    directory: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Parser)]
enum Command {
    /// Initialize a wiki in the current directory
    Init,

    /// Write a commented mvw.toml into the wiki root
    Config,

    /// Copy the built-in theme into the theme directory for customization
    Theme,

    /// Generate the static site
    Generate,

    /// Serve the wiki locally, rebuilding pages as they are requested (default)
    Serve(ServeArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG overrides, otherwise only warnings and errors
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let start = std::path::absolute(&cli.directory)
        .with_context(|| format!("Invalid directory: {}", cli.directory.display()))?;

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Init => commands::init::run(start).await,
        Command::Config => commands::config::run(start).await,
        Command::Theme => commands::theme::run(start).await,
        Command::Generate => commands::generate::run(start).await,
        Command::Serve(args) => commands::serve::run(start, args).await,
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "mvw", &mut io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["mvw"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.directory, PathBuf::from("."));
    }

    #[test]
    fn test_serve_flags() {
        let cli =
            Cli::try_parse_from(["mvw", "-C", "/tmp/wiki", "serve", "--port", "9000", "--lazy"])
                .unwrap();
        assert_eq!(cli.directory, PathBuf::from("/tmp/wiki"));
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(9000));
                assert!(args.lazy);
                assert!(!args.no_live_reload);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_rejects_extra_arguments() {
        assert!(Cli::try_parse_from(["mvw", "generate", "extra"]).is_err());
    }
}
