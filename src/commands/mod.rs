//! Commands
//!
//! Entry points for a UI or IPC layer. Every command returns a
//! `CommandResponse`; errors never cross this boundary.

pub mod agents;
pub mod extraction;
pub mod proposals;
pub mod settings;

pub use agents::*;
pub use extraction::*;
pub use proposals::*;
pub use settings::*;
