//
// color.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! Decoding and wire-encoding of the host's packed RGBA color integers.
//!
//! The host graphics engine packs a color as four bytes, least-significant
//! byte first: red, green, blue, alpha (`R_RGBA(r, g, b, a)` in
//! `GraphicsEngine.h`: `r | (g << 8) | (b << 16) | (a << 24)`). `None` means
//! the host signalled "no color" (e.g. `NA_INTEGER`); a present color with
//! a zero alpha byte means fully transparent. Both serialize to JSON `null`
//! -- per spec, `null` is never confused with the string `"transparent"`.

/// One decoded channel set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

pub fn decode(raw: u32) -> Rgba {
    Rgba {
        r: (raw & 0xff) as u8,
        g: ((raw >> 8) & 0xff) as u8,
        b: ((raw >> 16) & 0xff) as u8,
        a: ((raw >> 24) & 0xff) as u8,
    }
}

/// Render a color as its wire string, or `None` for the JSON `null` case.
pub fn to_wire(color: Option<u32>) -> Option<String> {
    let raw = color?;
    let Rgba { r, g, b, a } = decode(raw);
    if a == 0 {
        return None;
    }
    if a == 255 {
        return Some(format!("rgba({r},{g},{b},1)"));
    }
    // Three fractional digits, matching the JSON writer's own number
    // formatting rule so the two never disagree on trailing zeros.
    let alpha = (a as f64) / 255.0;
    Some(format!("rgba({r},{g},{b},{alpha:.3})"))
}
