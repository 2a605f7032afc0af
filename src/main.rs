use std::{process, rc::Rc};

use clap::Parser;
use log::{error, info};

use notebox::{App, Cli, Config, ErrorBoundary, FileStore, Result};

pub fn initialize_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

fn build_app(cli: &Cli) -> Result<App<Rc<FileStore>>> {
    let config = Config::load(cli.config.as_deref())?;
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => config.resolve_data_dir()?,
    };
    info!("Using data directory {}", data_dir.display());

    let store = Rc::new(FileStore::new(data_dir));
    Ok(App::new(store, config, cli.verbose))
}

fn main() {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    let mut app = match build_app(&cli) {
        Ok(app) => app,
        Err(e) => {
            error!("Startup failed: {}", e);
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let mut boundary = ErrorBoundary::new();
    if boundary.run(|| app.run(cli.command)).is_none() {
        if let Some(message) = boundary.fallback_message() {
            eprintln!("{}", message);
        }
        process::exit(1);
    }
}
