pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod notify;
pub mod routes;
pub mod state;
pub mod storage;
