//! # tareas
//!
//! Terminal client for the tareas task-list API.
//!
//! The crate is layered leaves first: [`storage`] persists the session token,
//! [`session`] owns it, [`net`] decorates outbound requests with it, and
//! [`router`] gates protected views on it. [`app`] wires the pieces together
//! for the `tareas` binary and for end-to-end tests.

pub mod app;
pub mod config;
pub mod net;
pub mod router;
pub mod session;
pub mod storage;
pub mod views;
