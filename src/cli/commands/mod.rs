pub mod config;
pub mod db;
pub mod dump;
pub mod fetch;
pub mod init;
pub mod list;
pub mod log;
pub mod purge;
pub mod refresh;
