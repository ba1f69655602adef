//! TOURNEY CLI - Command-line interface
//!
//! Commands:
//! - create / apply / approve / reject / applications / team: registration
//! - start / report / resolve / advance: running rounds
//! - show / standings / history / list: inspection
//! - simulate: play a whole event with random results in memory

mod output;
mod play;
mod setup;
mod simulate;
mod view;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tourney_service::{JsonFileStore, Service, ServiceConfig};

use output::Output;

#[derive(Parser)]
#[command(name = "tourney")]
#[command(about = "Swiss-system tournament organiser")]
struct Cli {
    /// JSON file holding all tournaments
    #[arg(long, global = true, value_name = "FILE", default_value = "tourney.json")]
    store: PathBuf,

    /// Random seed for pairings
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Output results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Do not draw the next round automatically after the last result
    #[arg(long, global = true)]
    manual: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty tournament
    Create(setup::CreateArgs),
    /// Apply to join a tournament
    Apply(setup::ApplyArgs),
    /// Approve an application (owner)
    Approve(setup::DecideArgs),
    /// Reject an application (owner)
    Reject(setup::DecideArgs),
    /// List pending applications
    Applications(setup::ApplicationsArgs),
    /// Enter a team with several members (owner)
    Team(setup::TeamArgs),
    /// Start the tournament and draw round one (owner)
    Start(play::StartArgs),
    /// Report the result of your match
    Report(play::ReportArgs),
    /// Set a match result, overriding opinions (owner)
    Resolve(play::ResolveArgs),
    /// Close the current round and draw the next one (owner)
    Advance(play::AdvanceArgs),
    /// Show a tournament and the matches of a round
    Show(view::ShowArgs),
    /// Show the standings table
    Standings(view::StandingsArgs),
    /// Show a participant's matches
    History(view::HistoryArgs),
    /// List tournaments
    List(view::ListArgs),
    /// Simulate a full tournament with random results
    Simulate(simulate::SimulateArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so --json output stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ServiceConfig::default().with_auto_advance(!cli.manual);
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    let out = Output::new(cli.json);

    // Opening the store touches no files until the first command runs
    let service = Service::new(JsonFileStore::open(&cli.store), config.clone());

    match cli.command {
        Commands::Create(args) => setup::create(args, &service, out),
        Commands::Apply(args) => setup::apply(args, &service, out),
        Commands::Approve(args) => setup::approve(args, &service, out),
        Commands::Reject(args) => setup::reject(args, &service, out),
        Commands::Applications(args) => setup::applications(args, &service, out),
        Commands::Team(args) => setup::team(args, &service, out),
        Commands::Start(args) => play::start(args, &service, out),
        Commands::Report(args) => play::report(args, &service, out),
        Commands::Resolve(args) => play::resolve(args, &service, out),
        Commands::Advance(args) => play::advance(args, &service, out),
        Commands::Show(args) => view::show(args, &service, out),
        Commands::Standings(args) => view::standings(args, &service, out),
        Commands::History(args) => view::history(args, &service, out),
        Commands::List(args) => view::list(args, &service, out),
        Commands::Simulate(args) => simulate::run(args, config, out),
    }
}
