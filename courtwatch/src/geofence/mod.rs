//! Region membership tracking.
//!
//! A [`Region`] is a named circle. [`MembershipState`] records, per region,
//! whether the user is currently inside it, and [`evaluate`] advances that
//! state by one [`PositionSample`], yielding a [`TransitionEvent`] for every
//! boundary actually crossed.
//!
//! # State Machine
//!
//! ```text
//!            sample inside / Enter
//!   Outside ----------------------> Inside
//!      ^                              |
//!      +------------------------------+
//!            sample outside / Exit
//! ```
//!
//! Every region starts `Outside`, so the first sample that lands inside a
//! region produces an `Enter` with no preceding `Exit`.

mod membership;
mod region;

pub use membership::{evaluate, MembershipState, RegionMembership};
pub use region::{PositionSample, Region, TransitionEvent, TransitionKind};
