//! Database access shared by lichen agents

pub mod init;

pub use init::init_database;
