//! kbchat-view library.
//!
//! View logic for a chat and wallet client: timeline annotation, the
//! message row view model, badge-state ingestion and the wallets reducer.

pub mod badges;
pub mod config;
pub mod error;
pub mod logging;
pub mod message;
pub mod notifications;
pub mod protocol;
pub mod state;
pub mod throttle;
pub mod timeline;
pub mod timestamp;
pub mod wallets;
pub mod wrapper;
