use mechanic_shop::config;
use mechanic_shop::core::db::{ConnectionSettings, Database};
use mechanic_shop::core::ShopError;
use mechanic_shop::menu::MenuController;
use std::io;
use std::process::ExitCode;
use tracing::{error, info};

const USAGE: &str = "Usage: mechanic-shop <dbname> <port> <user>";

fn main() -> ExitCode {
    let config = match config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // Log lines go to stderr so they never interleave with result tables
    let level = config.logging.level().unwrap_or(tracing::Level::WARN);
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    info!("Starting mechanic-shop...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let settings = match ConnectionSettings::from_args(
        &args,
        config.database.backend,
        &config.database.host,
        &config.database.password,
    ) {
        Ok(settings) => settings,
        Err(e @ ShopError::Usage(_)) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Connecting to database...");
    println!("Connection URL: {}\n", settings.url());
    let mut db = match Database::connect(&settings) {
        Ok(db) => db,
        Err(e) => {
            error!("connection failed: {}", e);
            eprintln!("Error - Unable to Connect to Database: {}", e);
            println!("Make sure you started {} on this machine", settings.backend);
            return ExitCode::FAILURE;
        }
    };
    println!("Done");

    {
        let stdin = io::stdin();
        let mut controller = MenuController::new(&mut db, stdin.lock(), io::stdout(), io::stderr());
        if let Err(e) = controller.run() {
            eprintln!("{}", e);
        }
    }

    print!("Disconnecting from database...");
    db.cleanup();
    println!("Done\n\nBye !");
    ExitCode::SUCCESS
}
