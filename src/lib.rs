//! Control-plane microservice for the dashcam streaming stack
//!
//! Aggregates the liveness of the MediaMTX and camera services into one
//! health verdict, and switches the persisted `MEDIAMTX_MODE` flag that the
//! supervised services read on their next restart.

pub mod config;
pub mod control;
pub mod server;
pub mod system;
