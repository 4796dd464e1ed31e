//
// mod.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! Minimal, dependency-free codecs for the raster op (§4.G): the PNG
//! encoder and its base64/CRC32/Adler-32 building blocks are
//! implementation plumbing, not protocol surface, so they are hand
//! rolled here rather than pulled in as crates.

pub mod adler32;
pub mod base64;
pub mod crc32;
pub mod png;
