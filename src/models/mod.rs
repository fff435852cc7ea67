//! Data Models
//!
//! Contains all data structures used throughout the application.

pub mod agent;
pub mod proposal;
pub mod response;
pub mod settings;

pub use agent::*;
pub use proposal::*;
pub use response::*;
pub use settings::*;
