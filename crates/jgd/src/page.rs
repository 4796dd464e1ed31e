//
// page.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! The page assembler (spec §4.C): accumulates ops for the plot currently
//! being drawn and serializes either the whole array or just the suffix
//! appended since the last flush.

use crate::json::Writer;
use crate::ops::Op;

/// The device extent in force when a page began (spec §3, Page).
#[derive(Debug, Clone, Copy)]
pub struct DeviceDims {
    pub width_px: f64,
    pub height_px: f64,
    pub dpi: f64,
    pub bg: Option<u32>,
}

pub struct Page {
    dims: DeviceDims,
    /// `"[" ... op, op, ... "]"`, kept valid JSON at every point so a delta
    /// slice can always be taken between two pushes.
    buf: Writer,
    op_count: u64,
    /// Byte offset into `buf` marking the start of not-yet-flushed ops
    /// (just after the `[`, or just after the last comma flushed up to).
    last_flush_offset: usize,
    /// How many ops had been transmitted as of the last `serialize_ops`
    /// call. Zero means this page has never been flushed -- the signal the
    /// callback shim uses to force a full (rather than delta) frame.
    last_flushed_op_count: u64,
}

impl Page {
    pub fn new(dims: DeviceDims) -> Self {
        let mut buf = Writer::new();
        buf.raw_char('[');
        buf.raw_char(']');
        Page {
            dims,
            buf,
            op_count: 0,
            last_flush_offset: 1,
            last_flushed_op_count: 0,
        }
    }

    pub fn dims(&self) -> DeviceDims {
        self.dims
    }

    pub fn op_count(&self) -> u64 {
        self.op_count
    }

    pub fn last_flushed_op_count(&self) -> u64 {
        self.last_flushed_op_count
    }

    pub fn has_unflushed_ops(&self) -> bool {
        self.last_flushed_op_count < self.op_count
    }

    /// Append one op. Never retracted once appended (spec §4.D invariant).
    pub fn push(&mut self, op: &Op) {
        // buf always ends with ']'; reopen it, append, reclose.
        let close = self.buf.len() - 1;
        debug_assert_eq!(&self.buf.as_str()[close..], "]");
        self.buf.truncate(close);
        if self.op_count > 0 {
            self.buf.raw_char(',');
        }
        op.write_json(&mut self.buf);
        self.buf.raw_char(']');
        self.op_count += 1;
    }

    /// Produce the `ops` array fragment (just the `[...]`, no `"ops":` key)
    /// and advance the flush bookkeeping. `incremental` is honored only if
    /// a previous flush left `last_flush_offset` inside the current array
    /// *and* this page has already had a first flush; otherwise this
    /// silently falls back to a full frame (mirrors `serialize_frame` in
    /// spec §4.C -- the first flush on a page is always full, never a
    /// delta, so the renderer can tell it is looking at a complete plot).
    pub fn serialize_ops(&mut self, incremental: bool) -> (String, bool) {
        let end = self.buf.len() - 1; // position of the closing ']'
        let delta_possible = self.last_flushed_op_count > 0 && self.last_flush_offset < end;

        let (fragment, was_incremental) = if incremental && delta_possible {
            let mut slice = self.buf.as_str()[self.last_flush_offset..end].to_string();
            if slice.starts_with(',') {
                slice.remove(0);
            }
            (format!("[{slice}]"), true)
        } else {
            (self.buf.as_str().to_string(), false)
        };

        self.last_flush_offset = end;
        self.last_flushed_op_count = self.op_count;
        (fragment, was_incremental)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{Font, GraphicsContext, LineEnd, LineJoin};

    fn dims() -> DeviceDims {
        DeviceDims { width_px: 504.0, height_px: 504.0, dpi: 72.0, bg: None }
    }

    fn rect() -> Op {
        Op::Rect {
            x0: 0.0,
            y0: 0.0,
            x1: 504.0,
            y1: 504.0,
            gc: GraphicsContext {
                col: None,
                fill: None,
                lwd: 1.0,
                lty: 0,
                lend: LineEnd::Round,
                ljoin: LineJoin::Round,
                lmitre: 10.0,
                font: Font { family: "sans".into(), face: 1, size: 12.0, lineheight: 1.2 },
            },
        }
    }

    #[test]
    fn first_flush_is_full_even_if_incremental_requested() {
        let mut page = Page::new(dims());
        page.push(&rect());
        let (ops, was_incremental) = page.serialize_ops(true);
        assert!(!was_incremental);
        let value: serde_json::Value = serde_json::from_str(&ops).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
    }

    #[test]
    fn delta_contains_only_suffix() {
        let mut page = Page::new(dims());
        page.push(&rect());
        let _ = page.serialize_ops(false); // full flush, establishes baseline

        page.push(&rect());
        page.push(&rect());
        let (ops, was_incremental) = page.serialize_ops(true);
        assert!(was_incremental);
        let value: serde_json::Value = serde_json::from_str(&ops).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn delta_then_full_concatenation_equals_full_history() {
        let mut page = Page::new(dims());
        page.push(&rect());
        let (first, _) = page.serialize_ops(false);

        page.push(&rect());
        let (second, was_incremental) = page.serialize_ops(true);
        assert!(was_incremental);

        let first_count = serde_json::from_str::<serde_json::Value>(&first)
            .unwrap()
            .as_array()
            .unwrap()
            .len();
        let second_count = serde_json::from_str::<serde_json::Value>(&second)
            .unwrap()
            .as_array()
            .unwrap()
            .len();
        assert_eq!(first_count + second_count, page.op_count() as usize);
    }

    #[test]
    fn empty_page_serializes_to_empty_array() {
        let mut page = Page::new(dims());
        let (ops, _) = page.serialize_ops(false);
        assert_eq!(ops, "[]");
    }
}
