//! HTTP request handlers for the Caseforge web server

pub mod health;
pub mod recommend;
pub mod types;

pub use health::*;
pub use recommend::*;
pub use types::*;
