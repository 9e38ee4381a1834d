// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod ip_visit_repository;
pub mod memo_repository;
pub mod stock_code_repository;

pub use ip_visit_repository::*;
pub use memo_repository::*;
pub use stock_code_repository::*;
