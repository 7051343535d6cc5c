//! Service layer for business logic
//!
//! Access evaluation, view accounting, the link service used by every
//! interface, and the background expiry sweeper.

pub mod access;
mod accountant;
mod link_service;
pub mod sweeper;

pub use access::{Decision, DenyReason, evaluate};
pub use accountant::ViewAccountant;
pub use link_service::*;
pub use sweeper::{ExpirySweeper, SweepReport, SweeperHandle, SweeperSettings};
