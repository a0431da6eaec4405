pub mod api;
pub mod checkout;
pub mod config;
pub mod db;
pub mod ipc;
pub mod models;
pub mod quiz;
pub mod session;
pub mod storage;
pub mod store;
pub mod upload;
