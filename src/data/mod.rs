//! Persistence layer: SQLite database, migrations, models, and the room store

mod database;
mod migrations;
mod models;
mod room;

pub use database::{Database, DatabaseError};
pub use models::{Expense, PairState, Party, Room};
pub use room::{Imported, RoomStore};
