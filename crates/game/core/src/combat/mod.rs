//! Per-agent combat bookkeeping.
//!
//! - `cooldown`: per-slot base and combo timers
//! - `aggro`: threat table keyed by opponent handle
//! - `guard`: guard profile, damage reduction and the parry roll
//!
//! Everything here is owned by a single agent and mutated only from that
//! agent's update or from the resolver acting on its behalf.

pub mod aggro;
pub mod cooldown;
pub mod guard;

pub use aggro::{AggroEntry, AggroTable};
pub use cooldown::{Cooldown, CooldownTable, SlotKey};
pub use guard::{GuardProfile, parry_succeeds};
