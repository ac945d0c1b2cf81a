use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

#[derive(Parser)]
#[command(name = "report-canvas")]
#[command(version)]
#[command(about = "Render a JSON report description to a single-page PDF", long_about = None)]
struct Cli {
    /// Report description (JSON)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output PDF (defaults to INPUT with a .pdf extension)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let output = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension("pdf"));

    match report_canvas::render_description_file(&cli.input, &output) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
