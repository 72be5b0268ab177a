//! Flutter-facing bindings for the MindCare core.

pub mod api;
