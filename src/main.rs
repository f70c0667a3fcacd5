use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use menagerie::app::{App, Status};
use menagerie::controller::Controller;
use menagerie::domain::{AppError, TableConfig};
use menagerie::model::TableController;
use menagerie::source::JsonDirSource;
use menagerie::ui::TableUI;

#[derive(Debug, Parser)]
#[command(version, about = "Browse and edit animal tables in the terminal")]
struct Args {
    /// Directory holding one <category>.json file per table.
    #[arg(short, long, default_value = "./data")]
    data_dir: String,

    /// Where log output goes; the terminal belongs to the UI.
    #[arg(long, default_value = "menagerie.log")]
    log_file: String,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Rows per page.
    #[arg(long)]
    page_size: Option<usize>,

    /// Print the render description of every table as JSON and exit.
    #[arg(long)]
    dump: bool,

    /// Event poll interval in milliseconds.
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_logging(args: &Args) -> Result<(), AppError> {
    let path = shellexpand::full(&args.log_file)
        .map_err(|e| AppError::Config(e.to_string()))?
        .into_owned();
    let file = File::create(&path)?;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .map_err(|e| AppError::Logging(e.to_string()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}

fn run(args: Args) -> Result<(), AppError> {
    init_logging(&args)?;

    let data_dir: PathBuf = shellexpand::full(&args.data_dir)
        .map_err(|e| AppError::Config(e.to_string()))?
        .into_owned()
        .into();
    info!("Starting menagerie with data from {}", data_dir.display());

    let configs: Vec<TableConfig> = TableConfig::presets()
        .into_iter()
        .map(|config| match args.page_size {
            Some(size) => config.page_size(size),
            None => config,
        })
        .collect();

    let tables = load_tables(configs, JsonDirSource::new(data_dir))?;

    if args.dump {
        for table in &tables {
            let json = serde_json::to_string_pretty(table.view())
                .map_err(|e| AppError::Io(e.into()))?;
            println!("{json}");
        }
        return Ok(());
    }

    let mut app = App::new(tables);
    let mut ui = TableUI::new();
    let controller = Controller::new(args.poll_ms);

    let mut terminal = ratatui::init();
    let result = (|| -> Result<(), AppError> {
        while app.status != Status::QUITTING {
            terminal.draw(|f| ui.draw(&app, f))?;
            if let Some(message) = controller.handle_event(&app)? {
                app.update(message);
            }
        }
        Ok(())
    })();
    ratatui::restore();
    result
}

fn load_tables(configs: Vec<TableConfig>, source: JsonDirSource) -> Result<Vec<TableController>, AppError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(async {
        let mut tables = Vec::with_capacity(configs.len());
        for config in configs {
            tables.push(TableController::load(config, &source).await);
        }
        tables
    }))
}
