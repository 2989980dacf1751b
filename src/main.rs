use dotenvy::dotenv;
use restaurant_book::{
    config::{database, floor},
    core::seed,
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the floor configuration
    let floor_config = floor::load_default_config()
        .inspect_err(|e| error!("Failed to load floor configuration: {}", e))?;
    info!("Successfully processed floor configuration.");

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed tables, zones, menu and staff
    let summary = seed::seed_floor(&db, &floor_config)
        .await
        .inspect_err(|e| error!("Failed to seed floor: {}", e))?;
    info!(
        tables = summary.tables,
        zones = summary.zones,
        menu_items = summary.menu_items,
        users = summary.users,
        "Floor ready"
    );

    Ok(())
}
