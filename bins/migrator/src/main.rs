//! Database migration runner for Hashdrop.
//!
//! Usage:
//!   migrator up      - Create the uploads table
//!   migrator down    - Drop it again
//!   migrator status  - Show migration status
//!
//! The connection string is read from `DATABASE_URL`.

use sea_orm_migration::prelude::*;
use hashdrop_db::migration::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    cli::run_cli(Migrator).await;
}
