use clap::Parser;
use folio::build::build_site;
use folio::config::Config;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::Path;
use std::process::exit;

/// Builds the site in the current directory into `public/`. Settings may be
/// overridden in an optional `site.yaml`.
#[derive(Parser)]
#[command(name = "folio", version, long_about = None)]
struct Cli {}

fn main() {
    let _cli = Cli::parse();

    if let Err(e) = SimpleLogger::new().with_level(LevelFilter::Info).env().init() {
        eprintln!("initializing logger: {}", e);
    }

    if let Err(e) = run() {
        log::error!("{}", e);
        exit(1);
    }
}

fn run() -> Result<(), folio::build::Error> {
    let config = Config::from_directory(Path::new("."))?;
    build_site(&config)?;
    Ok(())
}
