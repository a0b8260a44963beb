//! Network layer: wire types and the authenticated REST client.

pub mod api;
pub mod types;
