use std::{convert::Infallible, time::Duration};

use clap::{
    Args, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use sporlauth::{cli, config, error, scopes::Scopes};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with the Spotify accounts service
    Auth(FlowOptions),

    /// Authorize and show the current user's profile
    Me(FlowOptions),

    /// List all known authorization scopes
    Scopes,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Args, Debug, Clone)]
pub struct FlowOptions {
    /// Scopes to request, space or comma separated
    #[clap(long, default_value = "user-read-private user-read-email", value_parser = parse_scopes)]
    scope: Scopes,

    /// Seconds to wait for the browser redirect before giving up
    #[clap(long, default_value_t = 120)]
    timeout: u64,

    /// Print the authorization URL instead of opening a browser
    #[clap(long)]
    no_browser: bool,
}

impl From<FlowOptions> for cli::AuthOptions {
    fn from(opts: FlowOptions) -> Self {
        cli::AuthOptions {
            scopes: opts.scope,
            timeout: (opts.timeout > 0).then(|| Duration::from_secs(opts.timeout)),
            no_browser: opts.no_browser,
        }
    }
}

fn parse_scopes(s: &str) -> Result<Scopes, Infallible> {
    s.parse()
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env() {
        error!("Cannot load environment. Err: {}", e);
    }

    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Auth(opts) => cli::auth(opts.into()).await,
        Command::Me(opts) => cli::me(opts.into()).await,
        Command::Scopes => cli::scopes(),
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
