// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod api;
pub mod directory;
pub mod ip_visit;
pub mod memo;
pub mod stock_code;

pub use api::*;
pub use directory::*;
pub use ip_visit::*;
pub use memo::*;
pub use stock_code::*;
