pub mod connection;
pub mod kv;
pub mod setup;

pub use connection::{create_pool, get_connection, DbConn, DbPool};
pub use kv::SqliteStore;
