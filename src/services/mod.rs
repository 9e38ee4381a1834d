// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod chat_hub;
pub mod clock;
pub mod file_service;
pub mod memo_service;
pub mod sensitive_words;
pub mod stock_api_client;
pub mod stock_code_service;
pub mod visit_service;

pub use chat_hub::*;
pub use clock::*;
pub use file_service::*;
pub use memo_service::*;
pub use sensitive_words::*;
pub use stock_api_client::*;
pub use stock_code_service::*;
pub use visit_service::*;
