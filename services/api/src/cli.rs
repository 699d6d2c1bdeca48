use crate::demo::{run_demo, run_legend, run_render, DemoArgs, LegendArgs, RenderArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use county_atlas::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "County Atlas",
    about = "Serve and render county affordability and prosperity choropleths",
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
    /// Join scores onto boundaries for one household and write GeoJSON
    Render(RenderArgs),
    /// Print the legend for a score type
    Legend(LegendArgs),
    /// Walk through the bundled sample datasets
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
        Command::Render(args) => run_render(args).await,
        Command::Legend(args) => run_legend(args),
        Command::Demo(args) => run_demo(args),
    }
}
