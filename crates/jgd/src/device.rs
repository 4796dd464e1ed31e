//
// device.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! The callback shim's device state (§4.D), kept free of any R FFI so it
//! can be driven and tested with plain Rust values. The glue that
//! marshals `pDevDesc`/`pGEcontext` into calls on this type -- and that
//! performs the actual host-runtime snapshot capture/replay -- lives in
//! the FFI adapter crate, behind the [`Host`] trait.

use uuid::Uuid;

use crate::codecs::base64;
use crate::codecs::png;
use crate::frame;
use crate::metrics::MetricsClient;
use crate::ops::Font;
use crate::ops::GraphicsContext;
use crate::ops::Op;
use crate::ops::Winding;
use crate::page::DeviceDims;
use crate::page::Page;
use crate::resize::ResizeAction;
use crate::resize::ResizeCoordinator;
use crate::snapshot::SnapshotStore;
use crate::transport::Transport;

/// Host-runtime operations the device state cannot perform itself: it
/// has no notion of the host's graphics engine, only of the protocol
/// that describes what that engine drew.
pub trait Host {
    type Snapshot;

    /// Preserve enough host-runtime state to replay the plot that was
    /// just completed.
    fn capture_snapshot(&mut self) -> Self::Snapshot;

    /// Ask the host to re-issue every drawing callback for the plot
    /// currently on screen (used for a plain resize).
    fn replay_current(&mut self);

    /// Ask the host to re-issue every drawing callback for a previously
    /// captured snapshot (used for a `plotIndex` resize).
    fn replay_snapshot(&mut self, snapshot: &Self::Snapshot);
}

pub struct DeviceState<S> {
    width_px: f64,
    height_px: f64,
    dpi: f64,
    session_id: String,
    page_count: u64,
    drawing: bool,
    hold_level: i32,
    replaying: bool,
    new_page_pending: bool,
    transport: Transport,
    resize: ResizeCoordinator,
    metrics: MetricsClient,
    page: Option<Page>,
    snapshots: SnapshotStore<S>,
    last_snapshot: Option<S>,
}

impl<S> DeviceState<S> {
    pub fn new(width_in: f64, height_in: f64, dpi: f64, transport: Transport) -> Self {
        DeviceState {
            width_px: width_in * dpi,
            height_px: height_in * dpi,
            dpi,
            session_id: Uuid::new_v4().to_string(),
            page_count: 0,
            drawing: false,
            hold_level: 0,
            replaying: false,
            new_page_pending: false,
            transport,
            resize: ResizeCoordinator::new(),
            metrics: MetricsClient::new(),
            page: None,
            snapshots: SnapshotStore::default(),
            last_snapshot: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn page_count(&self) -> u64 {
        self.page_count
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Current device extent in pixels, top-left origin: `(left, right,
    /// bottom, top)`.
    pub fn size(&self) -> (f64, f64, f64, f64) {
        (0.0, self.width_px, self.height_px, 0.0)
    }

    fn push_op(&mut self, op: Op) {
        if let Some(page) = self.page.as_mut() {
            page.push(&op);
        }
    }

    pub fn clip(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        self.push_op(Op::Clip { x0, y0, x1, y1 });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, gc: GraphicsContext) {
        self.push_op(Op::Line { x1, y1, x2, y2, gc });
    }

    pub fn polyline(&mut self, x: Vec<f64>, y: Vec<f64>, gc: GraphicsContext) {
        self.push_op(Op::Polyline { x, y, gc });
    }

    pub fn polygon(&mut self, x: Vec<f64>, y: Vec<f64>, gc: GraphicsContext) {
        self.push_op(Op::Polygon { x, y, gc });
    }

    pub fn rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, gc: GraphicsContext) {
        self.push_op(Op::Rect { x0, y0, x1, y1, gc });
    }

    pub fn circle(&mut self, x: f64, y: f64, r: f64, gc: GraphicsContext) {
        self.push_op(Op::Circle { x, y, r, gc });
    }

    pub fn text(&mut self, x: f64, y: f64, text: String, rot: f64, hadj: f64, gc: GraphicsContext) {
        self.push_op(Op::Text { x, y, text, rot, hadj, gc });
    }

    pub fn path(&mut self, subpaths: Vec<Vec<(f64, f64)>>, winding: Winding, gc: GraphicsContext) {
        self.push_op(Op::Path { subpaths, winding, gc });
    }

    /// Encode raw RGBA8 source pixels as a PNG data URI and append the
    /// raster op (§4.G).
    pub fn raster(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        rot: f64,
        interpolate: bool,
        pw: u32,
        ph: u32,
        rgba: &[u8],
    ) {
        let png_bytes = png::encode(pw, ph, rgba);
        let data_uri = format!("data:image/png;base64,{}", base64::encode(&png_bytes));
        self.push_op(Op::Raster { x, y, w, h, rot, interpolate, pw, ph, data_uri });
    }

    pub fn str_width(&mut self, text: &str, font: &Font) -> f64 {
        self.metrics.str_width(&mut self.transport, &mut self.resize, text, font)
    }

    pub fn metric_info(&mut self, c: char, font: &Font) -> (f64, f64, f64) {
        self.metrics.metric_info(&mut self.transport, &mut self.resize, c, font)
    }

    /// Emit a frame if the current page has unflushed ops. `force_full`
    /// bypasses the page's own full/delta decision (used when closing
    /// out a page before a new one begins). Captures a snapshot whenever
    /// the resulting frame is full.
    fn flush(&mut self, force_full: bool, host: &mut impl Host<Snapshot = S>) -> bool {
        let Some(page) = self.page.as_mut() else {
            return false;
        };
        if !page.has_unflushed_ops() {
            return false;
        }
        let (ops_json, was_incremental) = page.serialize_ops(!force_full);
        let new_page_flag = self.new_page_pending && !was_incremental;
        let line = frame::render(&self.session_id, page.dims(), &ops_json, was_incremental, new_page_flag);
        let _ = self.transport.send(&line);
        if !was_incremental {
            self.last_snapshot = Some(host.capture_snapshot());
        }
        self.new_page_pending = false;
        true
    }

    pub fn new_page(&mut self, bg: Option<u32>, host: &mut impl Host<Snapshot = S>) {
        if !self.replaying {
            self.flush(true, host);
        }
        if let Some(snapshot) = self.last_snapshot.take() {
            self.snapshots.push(snapshot);
        }
        if let Some((w, h)) = self.resize.take_pending_for_new_page() {
            self.width_px = w;
            self.height_px = h;
        }
        self.page = Some(Page::new(DeviceDims {
            width_px: self.width_px,
            height_px: self.height_px,
            dpi: self.dpi,
            bg,
        }));
        self.page_count += 1;
        self.new_page_pending = true;
    }

    pub fn mode(&mut self, value: i32, host: &mut impl Host<Snapshot = S>) {
        if value == 1 {
            self.drawing = true;
            return;
        }
        self.drawing = false;
        if self.hold_level > 0 {
            return;
        }
        self.flush(false, host);
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn holdflush(&mut self, level_delta: i32, host: &mut impl Host<Snapshot = S>) {
        let previous = self.hold_level;
        self.hold_level = (self.hold_level + level_delta).max(0);
        if previous > 0 && self.hold_level == 0 {
            self.flush(false, host);
        }
    }

    pub fn hold_level(&self) -> i32 {
        self.hold_level
    }

    pub fn close(&mut self, host: &mut impl Host<Snapshot = S>) {
        self.flush(false, host);
        let _ = self.transport.send(r#"{"type":"close"}"#);
        self.snapshots.clear();
        self.last_snapshot = None;
        self.page = None;
        self.transport.close();
    }

    /// Called at new-page boundaries: reads at most one control line.
    pub fn check_incoming(&mut self) {
        self.resize.check_incoming(&mut self.transport);
    }

    /// Called at host idle: reads at most one more control line, then
    /// invokes a host replay if a resize was pending. Returns whether a
    /// replay happened.
    pub fn poll_resize(&mut self, host: &mut impl Host<Snapshot = S>) -> bool {
        match self.resize.poll_resize(&mut self.transport) {
            ResizeAction::None => false,
            ResizeAction::CurrentPlot { w, h } => {
                self.width_px = w;
                self.height_px = h;
                let bg = self.page.as_ref().and_then(|p| p.dims().bg);
                self.page = Some(Page::new(DeviceDims { width_px: w, height_px: h, dpi: self.dpi, bg }));
                self.replaying = true;
                host.replay_current();
                self.replaying = false;
                true
            },
            ResizeAction::Snapshot { w, h, index } => {
                if self.snapshots.get(index as usize).is_some() {
                    self.page = Some(Page::new(DeviceDims { width_px: w, height_px: h, dpi: self.dpi, bg: None }));
                    self.replaying = true;
                    let snapshot = self.snapshots.get(index as usize).expect("checked above");
                    host.replay_snapshot(snapshot);
                    self.replaying = false;
                }
                true
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullHost {
        captures: u32,
        replays: u32,
    }

    impl Host for NullHost {
        type Snapshot = u32;

        fn capture_snapshot(&mut self) -> u32 {
            self.captures += 1;
            self.captures
        }

        fn replay_current(&mut self) {
            self.replays += 1;
        }

        fn replay_snapshot(&mut self, _snapshot: &u32) {
            self.replays += 1;
        }
    }

    fn gc() -> GraphicsContext {
        use crate::ops::Font;
        use crate::ops::LineEnd;
        use crate::ops::LineJoin;
        GraphicsContext {
            col: None,
            fill: None,
            lwd: 1.0,
            lty: 0,
            lend: LineEnd::Round,
            ljoin: LineJoin::Round,
            lmitre: 10.0,
            font: Font { family: "sans".into(), face: 1, size: 12.0, lineheight: 1.2 },
        }
    }

    fn device() -> DeviceState<u32> {
        DeviceState::new(7.0, 7.0, 72.0, Transport::disconnected())
    }

    #[test]
    fn full_flush_captures_a_snapshot_even_on_a_disconnected_transport() {
        let mut dev = device();
        let mut host = NullHost { captures: 0, replays: 0 };

        dev.new_page(None, &mut host);
        dev.rect(0.0, 0.0, 504.0, 504.0, gc());
        dev.mode(1, &mut host);
        dev.mode(0, &mut host);
        assert_eq!(host.captures, 1);

        dev.line(0.0, 0.0, 504.0, 504.0, gc());
        dev.mode(0, &mut host);
        // a second flush on the same page is a delta frame: no new capture.
        assert_eq!(host.captures, 1);

        dev.new_page(Some(0xffffffff), &mut host);
        dev.rect(0.0, 0.0, 504.0, 504.0, gc());
        dev.mode(0, &mut host);
        assert_eq!(host.captures, 2);
        assert_eq!(dev.page_count(), 2);
    }

    #[test]
    fn s6_hold_flush_batches_five_ops_into_one_full_frame() {
        let mut dev = device();
        let mut host = NullHost { captures: 0, replays: 0 };
        dev.new_page(None, &mut host);
        let before = host.captures;

        dev.holdflush(1, &mut host);
        dev.rect(0.0, 0.0, 1.0, 1.0, gc());
        dev.rect(0.0, 0.0, 1.0, 1.0, gc());
        dev.rect(0.0, 0.0, 1.0, 1.0, gc());
        dev.mode(0, &mut host);
        assert_eq!(host.captures, before); // still held, no flush yet

        dev.rect(0.0, 0.0, 1.0, 1.0, gc());
        dev.rect(0.0, 0.0, 1.0, 1.0, gc());
        dev.mode(0, &mut host);
        assert_eq!(host.captures, before);

        dev.holdflush(-1, &mut host);
        assert_eq!(host.captures, before + 1);
    }

    #[test]
    fn size_reports_pixels_from_inches_and_dpi() {
        let dev = device();
        assert_eq!(dev.size(), (0.0, 504.0, 504.0, 0.0));
    }

    #[test]
    fn close_is_idempotent_on_a_disconnected_transport() {
        let mut dev = device();
        let mut host = NullHost { captures: 0, replays: 0 };
        dev.new_page(None, &mut host);
        dev.rect(0.0, 0.0, 1.0, 1.0, gc());
        dev.close(&mut host);
        assert!(!dev.is_connected());
    }
}
