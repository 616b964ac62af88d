//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (`core-service`, `core-playback`). Host applications can
//! depend on `aatmabeat-workspace` and enable the documented features without
//! wiring each crate individually.
