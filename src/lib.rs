//! JustFix - wizard engine for multi-step tenant assistance flows
//!
//! Route maps, progress steps, session sync, form submission and the
//! batching GraphQL client shared by the JustFix family of sites.

pub mod address;
pub mod bootstrap;
pub mod config;
pub mod flows;
pub mod forms;
pub mod graphql;
pub mod logging;
pub mod progress;
pub mod routes;
pub mod session;
pub mod storage;
