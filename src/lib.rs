pub mod application;
pub mod archive;
pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod http;
pub mod listing;
pub mod package_manager;
pub mod probe;
pub mod runtime;
