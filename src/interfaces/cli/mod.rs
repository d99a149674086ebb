use std::path::PathBuf;

use clap::Parser;

use crate::io::format::molint_output;

const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

/// Logs a nicely formatted molint heading to the `molint-output` logger.
pub fn log_heading() {
    let version = if let Some(ver) = VERSION {
        format!("v{ver}")
    } else {
        "v unknown".to_string()
    };
    molint_output!("╭─────────────────────────────────────────────────────────────────────────────────────────────────────╮");
    molint_output!("│                                                                                                     │");
    molint_output!("│   ███╗   ███╗  ██████╗  ██╗      ██╗ ███╗   ██╗ ████████╗                                           │");
    molint_output!("│   ████╗ ████║ ██╔═══██╗ ██║      ██║ ████╗  ██║ ╚══██╔══╝                                           │");
    molint_output!("│   ██╔████╔██║ ██║   ██║ ██║      ██║ ██╔██╗ ██║    ██║                                              │");
    molint_output!("│   ██║╚██╔╝██║ ██║   ██║ ██║      ██║ ██║╚██╗██║    ██║                                              │");
    molint_output!("│   ██║ ╚═╝ ██║ ╚██████╔╝ ███████╗ ██║ ██║ ╚████║    ██║                                              │");
    molint_output!("│   ╚═╝     ╚═╝  ╚═════╝  ╚══════╝ ╚═╝ ╚═╝  ╚═══╝    ╚═╝                                              │");
    molint_output!("│                                                                                                     │");
    molint_output!("│   Molecular integrals over contracted Gaussian basis functions                      {version:>15} │");
    molint_output!("╰─────────────────────────────────────────────────────────────────────────────────────────────────────╯");
    molint_output!("");
}

/// Command-line arguments of the `molint` binary.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// The YAML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// The file to write the main output into. If absent, the main output goes to the console.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
