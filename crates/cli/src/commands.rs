//! Command implementations for the sediment binary

use sediment_migrate::{
    template, BatchRollback, DirectoryLoader, Executor, MigrationConfig, MigrationError,
    MigrationResult, MigrationStatus, PgLedger, Registry,
};
use sqlx::PgPool;

pub fn make_migration(name: &str) -> MigrationResult<()> {
    let config = MigrationConfig::default();
    let path = template::create_migration_file(&config, name)?;
    println!("Created migration: {}", path.display());
    Ok(())
}

pub async fn migrate() -> MigrationResult<()> {
    let config = MigrationConfig::default();
    let report = executor(&config).await?.apply().await?;

    if report.applied.is_empty() {
        println!("Nothing to migrate ({} already applied)", report.skipped);
        return Ok(());
    }
    for name in &report.applied {
        println!("Migrated: {}", name);
    }
    if let Some(batch) = report.batch {
        println!(
            "Applied {} migration(s) in batch {} ({} ms)",
            report.applied.len(),
            batch,
            report.execution_time_ms
        );
    }
    Ok(())
}

pub async fn rollback() -> MigrationResult<()> {
    let config = MigrationConfig::default();
    let report = executor(&config).await?.rollback_last_batch().await?;

    if report.rolled_back.is_empty() {
        println!("Nothing to rollback");
        return Ok(());
    }
    for name in &report.rolled_back {
        println!("Rolled back: {}", name);
    }
    println!(
        "Rolled back {} migration(s) ({} ms)",
        report.rolled_back.len(),
        report.execution_time_ms
    );
    Ok(())
}

pub async fn status() -> MigrationResult<()> {
    let config = MigrationConfig::default();
    let statuses = executor(&config).await?.status().await?;

    if statuses.is_empty() {
        println!("No migrations found");
        return Ok(());
    }
    println!("Migration status:");
    for (name, status) in statuses {
        match status {
            MigrationStatus::Pending => println!("  pending  {}", name),
            MigrationStatus::Applied { batch, applied_at } => println!(
                "  applied  {} (batch {}, {})",
                name,
                batch,
                applied_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
        }
    }
    Ok(())
}

async fn executor(config: &MigrationConfig) -> MigrationResult<Executor<PgPool, PgLedger>> {
    let pool = connect().await?;
    let registry = Registry::new(DirectoryLoader::new(config.migrations_dir.clone()));
    let ledger = PgLedger::with_table(pool.clone(), config.migrations_table.clone());
    Ok(Executor::new(registry, ledger, pool))
}

async fn connect() -> MigrationResult<PgPool> {
    let url = std::env::var("DATABASE_URL").map_err(|_| {
        MigrationError::Configuration("DATABASE_URL is not set".to_string())
    })?;
    PgPool::connect(&url).await.map_err(|e| {
        MigrationError::Configuration(format!("failed to connect to database: {}", e))
    })
}
