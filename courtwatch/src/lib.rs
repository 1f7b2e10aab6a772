//! CourtWatch - geofenced court check-ins and proximity search.
//!
//! The library turns a stream of position samples into enter/exit events for
//! a set of circular regions, rate-limits those events into notifications,
//! and ranks a court catalog by distance.
//!
//! - [`geo`]: haversine distance and circular containment
//! - [`geofence`]: per-region membership state machine
//! - [`notification`]: cooldown gate and delivery sink
//! - [`session`]: session state owner and channel-fed daemon
//! - [`poi`]: court search and autocomplete
//! - [`catalog`], [`config`], [`logging`]: loading and process setup

pub mod catalog;
pub mod config;
pub mod geo;
pub mod geofence;
pub mod logging;
pub mod notification;
pub mod poi;
pub mod session;
