//
// wire.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! Tagged control-message shapes for the inbound side of the protocol
//! (§6). Outbound frames, metrics requests and the close message are
//! hand-assembled with the [`crate::json::Writer`] instead of derived
//! `Serialize` impls, since they need byte-offset control the writer
//! alone provides; only the inbound half benefits from `serde_json`
//! parsing directly into a tagged enum.

use serde::Deserialize;

/// Anything the frontend can send us on the control channel, dispatched
/// by hand on the `type` tag (see [`parse_inbound`]) rather than via a
/// derived internally-tagged enum, since `server_info`'s payload is
/// never parsed beyond its tag. Unrecognized or malformed lines never
/// produce a value; callers treat that as "ignore the line" (§7,
/// `BadMessage`).
#[derive(Debug, PartialEq)]
pub enum Inbound {
    ServerInfo,
    Resize(Resize),
    MetricsResponse(MetricsResponse),
}

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
pub struct Resize {
    pub width: f64,
    pub height: f64,
    #[serde(rename = "plotIndex")]
    pub plot_index: Option<u32>,
}

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
pub struct MetricsResponse {
    pub id: u32,
    pub width: f64,
    pub ascent: Option<f64>,
    pub descent: Option<f64>,
}

/// Parse one NDJSON line into a known control message, or `None` for
/// anything unrecognized (server_info's payload shape is never
/// inspected beyond its `type` tag, and a line that fails to parse at
/// all -- malformed JSON, or a `type` this build doesn't know about --
/// is silently discarded per the error model in §7).
pub fn parse_inbound(line: &str) -> Option<Inbound> {
    #[derive(Deserialize)]
    struct Tag<'a> {
        #[serde(rename = "type")]
        kind: &'a str,
    }
    let tag: Tag = serde_json::from_str(line).ok()?;
    match tag.kind {
        "server_info" => Some(Inbound::ServerInfo),
        "resize" => serde_json::from_str::<Resize>(line).ok().map(Inbound::Resize),
        "metrics_response" => {
            serde_json::from_str::<MetricsResponse>(line).ok().map(Inbound::MetricsResponse)
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_resize() {
        let line = r#"{"type":"resize","width":800,"height":600}"#;
        match parse_inbound(line) {
            Some(Inbound::Resize(r)) => {
                assert_eq!(r.width, 800.0);
                assert_eq!(r.plot_index, None);
            },
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn parses_plot_index_resize() {
        let line = r#"{"type":"resize","width":640,"height":480,"plotIndex":0}"#;
        match parse_inbound(line) {
            Some(Inbound::Resize(r)) => assert_eq!(r.plot_index, Some(0)),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn parses_metrics_response() {
        let line = r#"{"type":"metrics_response","id":1,"width":42.5}"#;
        match parse_inbound(line) {
            Some(Inbound::MetricsResponse(m)) => {
                assert_eq!(m.id, 1);
                assert_eq!(m.width, 42.5);
                assert_eq!(m.ascent, None);
            },
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_discarded() {
        assert!(parse_inbound(r#"{"type":"something_new","foo":1}"#).is_none());
    }

    #[test]
    fn malformed_json_is_discarded() {
        assert!(parse_inbound("not json").is_none());
    }
}
