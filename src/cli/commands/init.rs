use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::log;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::warning;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file (skipped in test mode)
///  - the SQLite database
///  - all pending DB migrations
pub fn handle(cli: &Cli) -> AppResult<()> {
    //
    // 1️⃣ PREPARA CONFIGURAZIONE
    //
    let db_path = Config::init_all(cli.db.clone(), cli.test)?;
    let db_path = db_path.to_string_lossy().to_string();

    println!("⚙️  Initializing linkvault…");
    if !cli.test {
        println!("📄 Config file : {}", Config::config_file().display());
    }
    println!("🗄️  Database   : {}", &db_path);

    //
    // 2️⃣ APERTURA DB + MIGRAZIONI
    //
    let pool = DbPool::new(&db_path)?;
    let applied = init_db(&pool.conn)?;

    for version in &applied {
        println!("   • migration {version} applied");
    }
    println!("✅ Database initialized at {}", &db_path);

    //
    // 3️⃣ LOG INTERNO (non bloccante)
    //
    if let Err(e) = log::ttlog(
        &pool.conn,
        "init",
        "",
        &format!("Database initialized at {}", &db_path),
    ) {
        warning(format!("Failed to write internal log: {e}"));
    }

    println!("🎉 linkvault initialization completed!");
    Ok(())
}
