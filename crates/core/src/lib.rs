//! # Salesbridge Core
//!
//! Port interfaces between the consuming application and the ERP
//! infrastructure.
//!
//! ## Architecture
//! - Defines the traits implemented by `salesbridge-infra`
//! - Depends only on `salesbridge-domain`

pub mod erp_ports;

pub use erp_ports::*;
