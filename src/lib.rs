#![recursion_limit = "512"]

#[macro_use]
pub extern crate diesel;
#[macro_use]
extern crate diesel_migrations;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;

pub extern crate chrono;

pub use diesel::prelude::*;
pub use diesel::pg::PgConnection;

pub mod schema;
pub mod models;
pub mod errors;
pub mod activity;
pub mod catalog;
pub mod progress;
pub mod quiz;
pub mod streak;
pub mod xp;
pub mod stats;
pub mod certificate;
pub mod profile;
pub mod coach;

pub use crate::models::*;
pub use crate::errors::*;

pub fn db_connect(database_url: &str) -> Result<PgConnection> {
    PgConnection::establish(database_url).chain_err(|| "Error connecting to database!")
}

pub fn check_db(conn: &PgConnection) -> Result<bool> {
    run_db_migrations(conn).chain_err(|| "Couldn't run the migrations.")?;

    let modules: i64 = schema::modules::table
        .count()
        .get_result(conn)
        .chain_err(|| "Couldn't query for the seeded curriculum.")?;

    Ok(modules > 0)
}

#[cfg(not(debug_assertions))]
embed_migrations!();

#[cfg(not(debug_assertions))]
fn run_db_migrations(conn: &PgConnection) -> Result<()> {
    embedded_migrations::run(conn)?;
    Ok(())
}

#[cfg(debug_assertions)]
fn run_db_migrations(conn: &PgConnection) -> Result<()> {
    diesel_migrations::run_pending_migrations(conn)?;
    info!("Migrations checked.");
    Ok(())
}
