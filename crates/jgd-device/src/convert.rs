//
// convert.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! Translates the engine's `pGEcontext`/raster representations into the
//! protocol engine's op model (spec §3).

use jgd::ops::Font;
use jgd::ops::GraphicsContext;
use jgd::ops::LineEnd;
use jgd::ops::LineJoin;
use libr::pGEcontext;
use libr::R_GE_lineend;
use libr::R_GE_linejoin;

/// The engine signals "no color" with this sentinel rather than a packed
/// ARGB int (`NA_INTEGER` reinterpreted as unsigned, per
/// `R_ext/GraphicsEngine.h`). A present color with a zero alpha byte is a
/// distinct, ordinary fully-transparent color -- both serialize to JSON
/// `null` (spec §3 Color), but only this sentinel means "no color".
const R_NA_COLOR: u32 = 0x8000_0000;

fn decode_color(raw: std::ffi::c_uint) -> Option<u32> {
    if raw as u32 == R_NA_COLOR {
        None
    } else {
        Some(raw as u32)
    }
}

fn line_end(value: R_GE_lineend) -> LineEnd {
    match value {
        R_GE_lineend::GE_BUTT_CAP => LineEnd::Butt,
        R_GE_lineend::GE_SQUARE_CAP => LineEnd::Square,
        R_GE_lineend::GE_ROUND_CAP => LineEnd::Round,
    }
}

fn line_join(value: R_GE_linejoin) -> LineJoin {
    match value {
        R_GE_linejoin::GE_MITRE_JOIN => LineJoin::Miter,
        R_GE_linejoin::GE_BEVEL_JOIN => LineJoin::Bevel,
        R_GE_linejoin::GE_ROUND_JOIN => LineJoin::Round,
    }
}

/// `fontfamily` is a fixed `[c_char; 201]` buffer, NUL-terminated; an
/// empty family name is the engine's way of saying "device default".
fn font_family(bytes: &[std::ffi::c_char; 201]) -> String {
    let bytes: &[u8] = unsafe { std::slice::from_raw_parts(bytes.as_ptr() as *const u8, bytes.len()) };
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// # Safety
/// `gc` must be a valid, non-null `pGEcontext` for the duration of the call.
pub unsafe fn gc_from_engine(gc: pGEcontext) -> GraphicsContext {
    let gc = &*gc;
    GraphicsContext {
        col: decode_color(gc.col),
        fill: decode_color(gc.fill),
        lwd: gc.lwd,
        lty: gc.lty,
        lend: line_end(gc.lend),
        ljoin: line_join(gc.ljoin),
        lmitre: gc.lmitre,
        font: Font {
            family: font_family(&gc.fontfamily),
            face: gc.fontface.clamp(1, 5) as u8,
            size: gc.ps * gc.cex,
            lineheight: gc.lineheight,
        },
    }
}

/// Convert the engine's row-major `ARGB`-packed raster buffer (same
/// byte layout as a color: r | g<<8 | b<<16 | a<<24) into flat RGBA8
/// bytes for the PNG encoder.
///
/// # Safety
/// `raster` must point to `w * h` valid `c_uint`s.
pub unsafe fn rgba_from_raster(raster: *const std::ffi::c_uint, w: usize, h: usize) -> Vec<u8> {
    let pixels = std::slice::from_raw_parts(raster, w * h);
    let mut out = Vec::with_capacity(w * h * 4);
    for &pixel in pixels {
        out.push((pixel & 0xff) as u8);
        out.push(((pixel >> 8) & 0xff) as u8);
        out.push(((pixel >> 16) & 0xff) as u8);
        out.push(((pixel >> 24) & 0xff) as u8);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn na_color_decodes_to_none() {
        assert_eq!(decode_color(R_NA_COLOR), None);
    }

    #[test]
    fn fully_transparent_present_color_is_some() {
        // alpha byte 0, but not the NA sentinel -- still a real color.
        assert_eq!(decode_color(0x00ffffff), Some(0x00ffffff));
    }

    #[test]
    fn raster_pixel_expands_to_four_rgba_bytes() {
        let pixel: std::ffi::c_uint = 10 | (20 << 8) | (30 << 16) | (255 << 24);
        let rgba = unsafe { rgba_from_raster(&pixel as *const _, 1, 1) };
        assert_eq!(rgba, vec![10, 20, 30, 255]);
    }
}
