//! veridex-client — single-flight request tracking and the CLI client.

pub mod state;
