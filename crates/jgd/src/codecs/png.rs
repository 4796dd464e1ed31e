//
// png.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! A minimal PNG encoder for raw RGBA8 raster data (§4.G). Correctness,
//! not size: the only IDAT compression used is the zlib "stored"
//! (uncompressed) block type, so the encoder needs no compression
//! library at the cost of larger output than a real deflate pass would
//! produce.

use super::adler32::adler32;
use super::crc32::crc32;

const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
const MAX_STORED_BLOCK: usize = 65_535;

fn write_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    let mut body = Vec::with_capacity(4 + data.len());
    body.extend_from_slice(kind);
    body.extend_from_slice(data);
    out.extend_from_slice(&body);
    out.extend_from_slice(&crc32(&body).to_be_bytes());
}

/// Deflate's "stored" block encoding: a byte-aligned header, the raw
/// length and its one's complement, then the bytes verbatim.
fn stored_blocks(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len() + raw.len() / MAX_STORED_BLOCK * 5 + 5);
    let mut offset = 0;
    if raw.is_empty() {
        out.push(0x01); // BFINAL=1, BTYPE=00, empty final block
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0xffffu16.to_le_bytes());
        return out;
    }
    while offset < raw.len() {
        let end = (offset + MAX_STORED_BLOCK).min(raw.len());
        let is_final = end == raw.len();
        let block = &raw[offset..end];
        out.push(if is_final { 0x01 } else { 0x00 });
        let len = block.len() as u16;
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&(!len).to_le_bytes());
        out.extend_from_slice(block);
        offset = end;
    }
    out
}

/// Encode an 8-bit RGBA buffer (`width * height * 4` bytes, row-major,
/// top-to-bottom) as a complete PNG file.
pub fn encode(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
    debug_assert_eq!(rgba.len(), (width as usize) * (height as usize) * 4);

    let stride = width as usize * 4;
    let mut raw = Vec::with_capacity(height as usize * (stride + 1));
    for row in rgba.chunks(stride) {
        raw.push(0); // filter type 0 (None) on every scanline
        raw.extend_from_slice(row);
    }

    let mut zlib = Vec::with_capacity(raw.len() + 6);
    zlib.push(0x78); // CMF: deflate, 32K window
    zlib.push(0x01); // FLG: no preset dictionary, check bits for CMF/FLG pair
    zlib.extend_from_slice(&stored_blocks(&raw));
    zlib.extend_from_slice(&adler32(&raw).to_be_bytes());

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(6); // color type: truecolor with alpha
    ihdr.push(0); // compression method
    ihdr.push(0); // filter method
    ihdr.push(0); // interlace method

    let mut out = Vec::with_capacity(SIGNATURE.len() + ihdr.len() + zlib.len() + 64);
    out.extend_from_slice(&SIGNATURE);
    write_chunk(&mut out, b"IHDR", &ihdr);
    write_chunk(&mut out, b"IDAT", &zlib);
    write_chunk(&mut out, b"IEND", &[]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_png_signature() {
        let png = encode(1, 1, &[255, 0, 0, 255]);
        assert_eq!(&png[..8], &SIGNATURE);
    }

    #[test]
    fn ihdr_reports_dimensions_and_rgba_color_type() {
        let png = encode(2, 3, &vec![0u8; 2 * 3 * 4]);
        // length(4) + "IHDR"(4) precede the IHDR payload
        let ihdr = &png[8 + 8..8 + 8 + 13];
        assert_eq!(u32::from_be_bytes(ihdr[0..4].try_into().unwrap()), 2);
        assert_eq!(u32::from_be_bytes(ihdr[4..8].try_into().unwrap()), 3);
        assert_eq!(ihdr[8], 8); // bit depth
        assert_eq!(ihdr[9], 6); // color type
    }

    #[test]
    fn ends_with_iend_chunk() {
        let png = encode(1, 1, &[0, 0, 0, 0]);
        assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
    }

    #[test]
    fn large_raster_splits_into_multiple_stored_blocks() {
        // 300x300 RGBA needs more than 65535 raw bytes, forcing >1 block.
        let width = 300u32;
        let height = 300u32;
        let data = vec![128u8; (width * height * 4) as usize];
        let png = encode(width, height, &data);
        assert!(png.len() > (width * height * 4) as usize);
    }
}
