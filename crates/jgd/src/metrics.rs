//
// metrics.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! The synchronous text-metrics RPC (§4.E): `str_width` and `metric_info`
//! may be called in the middle of a host drawing call and are expected to
//! return before it proceeds, so a cache miss means a blocking round trip
//! over the transport, with a built-in approximation (§4.H) as the
//! fallback when the frontend doesn't answer in time.

use log::warn;

use crate::json::Writer;
use crate::ops::Font;
use crate::resize::ResizeCoordinator;
use crate::transport::Transport;
use crate::wire;

const CACHE_SIZE: usize = 512;
const MAX_ATTEMPTS: u32 = 5;
const RESPONSE_TIMEOUT_MS: u64 = 500;

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Combined hash of (key-bytes, face, size-bits, family-bytes). `key`
/// is the literal string for `strWidth`, or `c<codepoint>` for
/// `metricInfo` -- the "synthetic key prefix" the two call kinds share
/// one table under (§4.E).
fn cache_hash(key: &str, font: &Font) -> u64 {
    let mut bytes = Vec::with_capacity(key.len() + font.family.len() + 10);
    bytes.extend_from_slice(key.as_bytes());
    bytes.push(0);
    bytes.push(font.face);
    bytes.extend_from_slice(&font.size.to_bits().to_le_bytes());
    bytes.extend_from_slice(font.family.as_bytes());
    fnv1a(&bytes)
}

#[derive(Debug, Clone, Copy)]
enum CacheValue {
    Width(f64),
    Full { ascent: f64, descent: f64, width: f64 },
}

/// Single-bucket, hash-only table: a collision silently evicts whatever
/// was there, and a collision between two distinct keys silently returns
/// the wrong value. Documented tradeoff (§4.E, §9), not a bug.
struct Cache {
    slots: Vec<Option<(u64, CacheValue)>>,
}

impl Cache {
    fn new() -> Self {
        Cache { slots: vec![None; CACHE_SIZE] }
    }

    fn get(&self, hash: u64) -> Option<CacheValue> {
        match self.slots[(hash as usize) % CACHE_SIZE] {
            Some((h, v)) if h == hash => Some(v),
            _ => None,
        }
    }

    fn put(&mut self, hash: u64, value: CacheValue) {
        self.slots[(hash as usize) % CACHE_SIZE] = Some((hash, value));
    }
}

pub struct MetricsResult {
    pub width: f64,
    pub ascent: f64,
    pub descent: f64,
}

pub struct MetricsClient {
    next_id: u32,
    cache: Cache,
}

impl MetricsClient {
    pub fn new() -> Self {
        MetricsClient { next_id: 1, cache: Cache::new() }
    }

    pub fn str_width(&mut self, transport: &mut Transport, resize: &mut ResizeCoordinator, text: &str, font: &Font) -> f64 {
        let hash = cache_hash(text, font);
        if let Some(CacheValue::Width(w)) = self.cache.get(hash) {
            return w;
        }
        match self.request(transport, resize, Request::StrWidth(text), font) {
            Some(result) => {
                self.cache.put(hash, CacheValue::Width(result.width));
                result.width
            },
            None => approximate_str_width(text, font),
        }
    }

    pub fn metric_info(&mut self, transport: &mut Transport, resize: &mut ResizeCoordinator, c: char, font: &Font) -> (f64, f64, f64) {
        let key = format!("c{}", c as u32);
        let hash = cache_hash(&key, font);
        if let Some(CacheValue::Full { ascent, descent, width }) = self.cache.get(hash) {
            return (ascent, descent, width);
        }
        match self.request(transport, resize, Request::MetricInfo(c), font) {
            Some(result) => {
                self.cache.put(
                    hash,
                    CacheValue::Full { ascent: result.ascent, descent: result.descent, width: result.width },
                );
                (result.ascent, result.descent, result.width)
            },
            None => approximate_metric_info(c, font),
        }
    }

    fn request(
        &mut self,
        transport: &mut Transport,
        resize: &mut ResizeCoordinator,
        request: Request,
        font: &Font,
    ) -> Option<MetricsResult> {
        if !transport.is_connected() {
            return None;
        }
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        let line = build_request(id, &request, font);
        if transport.send(&line).is_err() {
            return None;
        }

        for _ in 0..MAX_ATTEMPTS {
            let Some(line) = transport.recv_line(RESPONSE_TIMEOUT_MS) else {
                warn!("metrics request {id} timed out waiting for a response");
                return None;
            };
            match wire::parse_inbound(&line) {
                Some(wire::Inbound::MetricsResponse(m)) if m.id == id => {
                    return Some(MetricsResult {
                        width: m.width,
                        ascent: m.ascent.unwrap_or(0.0),
                        descent: m.descent.unwrap_or(0.0),
                    });
                },
                Some(wire::Inbound::Resize(r)) => {
                    // Only the latest resize survives a long exchange;
                    // the resize coordinator will still replay once
                    // drawing resumes (§4.E "Resize-during-metrics").
                    resize.route(r);
                },
                _ => {},
            }
        }
        warn!("metrics request {id} exhausted its read attempts");
        None
    }
}

impl Default for MetricsClient {
    fn default() -> Self {
        Self::new()
    }
}

enum Request<'a> {
    StrWidth(&'a str),
    MetricInfo(char),
}

fn build_request(id: u32, request: &Request, font: &Font) -> String {
    let mut w = Writer::new();
    w.raw_char('{');
    w.key("type").string("metrics_request");
    w.raw_char(',');
    w.key("id").int(id as i64);
    w.raw_char(',');
    match request {
        Request::StrWidth(text) => {
            w.key("kind").string("strWidth");
            w.raw_char(',');
            w.key("str").string(text);
        },
        Request::MetricInfo(c) => {
            w.key("kind").string("metricInfo");
            w.raw_char(',');
            w.key("c").string(&c.to_string());
        },
    }
    w.raw_char(',');
    w.key("gc").raw_char('{');
    w.key("font").raw_char('{');
    w.key("family").string(&font.family);
    w.raw_char(',');
    w.key("face").int(font.face as i64);
    w.raw_char(',');
    w.key("size").number(font.size);
    w.raw_char('}');
    w.raw_char('}');
    w.raw_char('}');
    w.into_string()
}

fn family_width_ratio(family: &str, bold: bool) -> f64 {
    let family = family.to_ascii_lowercase();
    if family.contains("mono") {
        0.60
    } else if family.contains("serif") {
        if bold { 0.52 } else { 0.48 }
    } else if bold {
        0.56
    } else {
        0.53
    }
}

fn is_bold(face: u8) -> bool {
    face == 2 || face == 4
}

pub fn approximate_str_width(text: &str, font: &Font) -> f64 {
    let ratio = family_width_ratio(&font.family, is_bold(font.face));
    text.chars()
        .map(|c| if c == ' ' { 0.25 * font.size } else { ratio * font.size })
        .sum()
}

pub fn approximate_metric_info(c: char, font: &Font) -> (f64, f64, f64) {
    let ratio = family_width_ratio(&font.family, is_bold(font.face));
    let width = if c == ' ' { 0.25 * font.size } else { ratio * font.size };
    (0.75 * font.size, 0.25 * font.size, width)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font(family: &str, face: u8, size: f64) -> Font {
        Font { family: family.to_string(), face, size, lineheight: 1.2 }
    }

    #[test]
    fn request_line_has_expected_shape_for_str_width() {
        let line = build_request(7, &Request::StrWidth("Hello"), &font("sans", 1, 12.0));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["type"], "metrics_request");
        assert_eq!(value["id"], 7);
        assert_eq!(value["kind"], "strWidth");
        assert_eq!(value["str"], "Hello");
        assert_eq!(value["gc"]["font"]["family"], "sans");
    }

    #[test]
    fn request_line_has_expected_shape_for_metric_info() {
        let line = build_request(1, &Request::MetricInfo('x'), &font("serif", 2, 10.0));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["kind"], "metricInfo");
        assert_eq!(value["c"], "x");
    }

    #[test]
    fn space_width_is_overridden_regardless_of_family() {
        let f = font("monospace", 1, 20.0);
        assert_eq!(approximate_str_width(" ", &f), 5.0);
    }

    #[test]
    fn monospace_ratio_applies() {
        let f = font("monospace", 1, 10.0);
        assert_eq!(approximate_str_width("a", &f), 6.0);
    }

    #[test]
    fn bold_serif_uses_higher_ratio_than_regular() {
        let regular = approximate_str_width("a", &font("serif", 1, 10.0));
        let bold = approximate_str_width("a", &font("serif", 2, 10.0));
        assert!(bold > regular);
    }

    #[test]
    fn metric_info_fallback_uses_fixed_ascent_descent_fractions() {
        let (ascent, descent, _) = approximate_metric_info('a', &font("sans", 1, 100.0));
        assert_eq!(ascent, 75.0);
        assert_eq!(descent, 25.0);
    }

    #[test]
    fn cache_hit_avoids_recomputation_path() {
        let mut cache = Cache::new();
        let f = font("sans", 1, 12.0);
        let hash = cache_hash("Hello", &f);
        cache.put(hash, CacheValue::Width(42.5));
        match cache.get(hash) {
            Some(CacheValue::Width(w)) => assert_eq!(w, 42.5),
            other => panic!("expected cache hit, got {other:?}"),
        }
    }

    #[test]
    fn disconnected_transport_short_circuits_to_fallback() {
        let mut client = MetricsClient::new();
        let mut transport = Transport::disconnected();
        let mut resize = ResizeCoordinator::new();
        let f = font("sans", 1, 12.0);
        let width = client.str_width(&mut transport, &mut resize, "Hi", &f);
        assert_eq!(width, approximate_str_width("Hi", &f));
    }
}
