pub mod core;
pub mod db;
pub mod domain;
pub mod services;
pub mod utils;
