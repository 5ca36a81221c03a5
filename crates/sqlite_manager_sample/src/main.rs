//! Sample CLI over the SQLite manager core.
//!
//! # Responsibility
//! - Seed the sample users, list them and check one login.
//! - Export the database when asked to.
//!
//! Usage: `sqlite_manager_sample [username password] [--export]`

use sqlite_manager_core::{
    core_version, default_log_level, init_logging, Database, DatabaseConfig, DesktopLocator,
    FileLocator, RecordRepository,
};
use sqlite_manager_sample::{UserRepository, SAMPLE_DATABASE_FILENAME};
use std::process::ExitCode;
use std::sync::Arc;

const APP_NAME: &str = "SQLiteSample";

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1).collect::<Vec<_>>();
    let export = take_flag(&mut args, "--export");

    let locator = DesktopLocator::detect(APP_NAME).unwrap_or_else(|| {
        let root = std::env::temp_dir().join(APP_NAME);
        DesktopLocator::new(root.join("data"), root.join("exports"))
    });
    let log_dir = locator.data_dir().join("logs");
    if let Err(err) = init_logging(default_log_level(), &log_dir.display().to_string()) {
        eprintln!("logging disabled: {err}");
    }

    let config = DatabaseConfig::new().with_database_filename(SAMPLE_DATABASE_FILENAME);
    let database = Database::new(Arc::new(locator), config);

    match run(&database, &args, export) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(
    database: &Database,
    args: &[String],
    export: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    println!("sqlite_manager_core version={}", core_version());
    println!("database={}", database.database_path().display());

    let users = UserRepository::new(database)?;
    let seeded = users.seed_defaults()?;
    if seeded > 0 {
        println!("seeded {seeded} user(s)");
    }
    for user in users.records().select_all()? {
        println!("user {} id={}", user.username, user.meta.id());
    }

    let mut code = ExitCode::SUCCESS;
    if let [username, password] = args {
        match users.select_by_username_and_password(username, password)? {
            Some(user) => println!("welcome {}", user.username),
            None => {
                println!("user not found");
                code = ExitCode::FAILURE;
            }
        }
    }

    if export {
        let path = database.export_database()?;
        println!("exported to {}", path.display());
    }

    Ok(code)
}

fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    let before = args.len();
    args.retain(|arg| arg != flag);
    args.len() != before
}
