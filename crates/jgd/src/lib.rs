//
// lib.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! `jgd`: the protocol engine behind a graphics device recorder --
//! everything needed to turn host drawing callbacks into NDJSON frames
//! and stream them to an external renderer, with no dependency on any
//! particular host runtime's FFI surface. The R adapter lives in the
//! sibling `jgd-device` crate.

pub mod codecs;
pub mod color;
pub mod device;
pub mod error;
pub mod frame;
pub mod json;
pub mod metrics;
pub mod ops;
pub mod page;
pub mod resize;
pub mod snapshot;
pub mod transport;
pub mod wire;

pub use device::DeviceState;
pub use device::Host;
pub use error::Error;
pub use error::Result;
