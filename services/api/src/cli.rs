use crate::demo::{run_demo, DemoArgs};
use crate::screening::{run_match, run_screen, MatchArgs, ScreenArgs};
use crate::server;
use campus_placement::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Campus Placement Portal",
    about = "Run the campus placement portal or try its matching rules from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a skill list against a job's required skills
    Match(MatchArgs),
    /// Screen a CSV student roster against job criteria
    Screen(ScreenArgs),
    /// Run an end-to-end walkthrough against the sample campus
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Match(args) => run_match(args),
        Command::Screen(args) => run_screen(args),
        Command::Demo(args) => run_demo(args),
    }
}
