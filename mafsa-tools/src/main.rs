// Punkt wejścia narzędzia `mafsa-cli`.
pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mafsa-cli", bin_name = "mafsa-cli")]
#[command(about = "Budowa i kompakcja minimalnych acyklicznych automatów skończonych")]
pub struct Cli {
    /// Więcej komunikatów diagnostycznych (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Buduje leksykon i wypisuje statystyki grafu
    Build {
        #[command(flatten)]
        input: InputArgs,

        /// Zapisuje napisy zbudowanego leksykonu do pliku, po jednym w linii
        #[arg(long, value_name = "FILE")]
        dump: Option<PathBuf>,
    },

    /// Buduje leksykon i sprawdza, czy podane słowa do niego należą
    Lookup {
        #[command(flatten)]
        input: InputArgs,

        /// Słowa do sprawdzenia
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Wypisuje histogram etykiet krawędzi (dane wejściowe kodera)
    Labels {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Plik wejściowy z napisami, po jednym w linii ("-" lub brak: stdin)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Plik `.info` z opcjami budowy
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Poziom kompakcji (nadpisuje wartość z pliku opcji)
    #[arg(long, value_name = "LEVEL")]
    pub compaction: Option<usize>,

    /// Sortuje wejście przed budową (nadpisuje wartość z pliku opcji)
    #[arg(long)]
    pub sort: bool,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build { input, dump } => commands::build::run(&input, dump.as_deref()),
        Command::Lookup { input, words } => commands::lookup::run(&input, &words),
        Command::Labels { input } => commands::labels::run(&input),
    }
}
