use std::path::Path;
use std::process;

use anyhow::{self, format_err};
use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;

use molint::interfaces::cli::{log_heading, Cli};
use molint::interfaces::input::Input;
use molint::interfaces::InputHandle;
use molint::io::read_molint_yaml;

/// Sets up the loggers. Diagnostics go to the console; the main output goes to `output` if given
/// and to the console otherwise.
fn init_logging(output: Option<&Path>) -> Result<(), anyhow::Error> {
    let console = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l:<5})} {t} - {m}{n}",
        )))
        .build();
    let main_output: Box<dyn log4rs::append::Append> = match output {
        Some(path) => Box::new(
            FileAppender::builder()
                .encoder(Box::new(PatternEncoder::new("{m}{n}")))
                .append(false)
                .build(path)?,
        ),
        None => Box::new(
            ConsoleAppender::builder()
                .encoder(Box::new(PatternEncoder::new("{m}{n}")))
                .build(),
        ),
    };
    let config = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console)))
        .appender(Appender::builder().build("main_output", main_output))
        .logger(
            Logger::builder()
                .appender("main_output")
                .additive(false)
                .build("molint-output", LevelFilter::Info),
        )
        .build(Root::builder().appender("console").build(LevelFilter::Warn))?;
    log4rs::init_config(config)?;
    Ok(())
}

fn run(cli: &Cli) -> Result<(), anyhow::Error> {
    init_logging(cli.output.as_deref())?;
    log_heading();
    let config = cli
        .config
        .as_ref()
        .ok_or_else(|| format_err!("No configuration file specified."))?;
    let input = read_molint_yaml::<Input, _>(config)?;
    input.handle()
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}
