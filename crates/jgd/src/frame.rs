//
// frame.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! The NDJSON frame envelope (§4.B) wrapping a page assembler's op
//! payload.

use crate::color;
use crate::json::Writer;
use crate::page::DeviceDims;

/// Assemble one complete `{"type":"frame",...}` NDJSON line. `ops_json`
/// is pre-built JSON (the page assembler's output) spliced in raw.
pub fn render(session_id: &str, dims: DeviceDims, ops_json: &str, incremental: bool, new_page: bool) -> String {
    let mut w = Writer::with_capacity(ops_json.len() + 256);
    w.raw_char('{');
    w.key("type").string("frame");
    w.raw_char(',');
    w.key("incremental").bool(incremental);
    w.raw_char(',');
    if new_page {
        w.key("newPage").bool(true);
        w.raw_char(',');
    }
    w.key("plot").raw_char('{');
    w.key("version").int(1);
    w.raw_char(',');
    w.key("sessionId").string(session_id);
    w.raw_char(',');
    w.key("device").raw_char('{');
    w.key("width").number(dims.width_px);
    w.raw_char(',');
    w.key("height").number(dims.height_px);
    w.raw_char(',');
    w.key("dpi").number(dims.dpi);
    w.raw_char(',');
    w.key("bg").opt_string(color::to_wire(dims.bg).as_deref());
    w.raw_char('}');
    w.raw_char(',');
    w.key("ops").raw(ops_json);
    w.raw_char('}');
    w.raw_char('}');
    w.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims() -> DeviceDims {
        DeviceDims { width_px: 504.0, height_px: 504.0, dpi: 72.0, bg: None }
    }

    #[test]
    fn envelope_round_trips_through_serde() {
        let line = render("abc-123", dims(), "[]", false, true);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["type"], "frame");
        assert_eq!(value["incremental"], false);
        assert_eq!(value["newPage"], true);
        assert_eq!(value["plot"]["version"], 1);
        assert_eq!(value["plot"]["sessionId"], "abc-123");
        assert_eq!(value["plot"]["device"]["width"], 504.0);
        assert!(value["plot"]["device"]["bg"].is_null());
        assert_eq!(value["plot"]["ops"], serde_json::json!([]));
    }

    #[test]
    fn new_page_key_absent_when_false() {
        let line = render("abc", dims(), "[]", true, false);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert!(value.get("newPage").is_none());
    }
}
