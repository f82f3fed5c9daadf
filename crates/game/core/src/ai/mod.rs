//! AI targeting manager.
//!
//! Decides, for every AI agent, whom to fight and with which slot:
//!
//! 1. **Targeting**: engage the nearest opponent in sight, follow aggro,
//!    give up past pursuit range ([`TargetingManager`])
//! 2. **Alert**: spread an alert to idle allies nearby ([`propagate_alert`])
//! 3. **Decision**: pick the first ready slot that would reach the target
//!    ([`decide_action`])
//!
//! Everything here reads other agents through the start-of-tick
//! [`FieldSnapshot`](crate::agent::FieldSnapshot).

mod alert;
mod decision;
mod targeting;

pub use alert::propagate_alert;
pub use decision::decide_action;
pub use targeting::{TargetChange, TargetingManager, engage_followers};
