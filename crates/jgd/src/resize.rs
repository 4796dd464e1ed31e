//
// resize.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! The resize coordinator (§4.F): reconciles asynchronous resize
//! notifications against host drawing boundaries. Reads at most one
//! control message per call, by design (§5) -- draining the queue here
//! would decouple the frontend's resize count from the recorder's replay
//! count.

use crate::transport::Transport;
use crate::wire;

#[derive(Debug, Clone, Copy, PartialEq)]
struct PlotIndexResize {
    w: f64,
    h: f64,
    index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeAction {
    None,
    /// Replay a historical snapshot at the given dimensions.
    Snapshot { w: f64, h: f64, index: u32 },
    /// Replay the current plot at the given dimensions.
    CurrentPlot { w: f64, h: f64 },
}

#[derive(Default)]
pub struct ResizeCoordinator {
    pending_w: f64,
    pending_h: f64,
    plot_index: Option<PlotIndexResize>,
}

impl ResizeCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    fn has_pending_normal(&self) -> bool {
        self.pending_w > 0.0 && self.pending_h > 0.0
    }

    /// Route one already-parsed resize message into the appropriate
    /// buffer. A second plotIndex resize arriving while one is still
    /// buffered is dropped -- the buffer is single-slot by design.
    pub fn route(&mut self, msg: wire::Resize) {
        match msg.plot_index {
            Some(index) => {
                if self.plot_index.is_none() {
                    self.plot_index = Some(PlotIndexResize { w: msg.width, h: msg.height, index });
                }
            },
            None => {
                self.pending_w = msg.width;
                self.pending_h = msg.height;
            },
        }
    }

    fn drain_one(&mut self, transport: &mut Transport) {
        // Never read while the plotIndex slot is full: doing so risks
        // overwriting it with a normal resize before it is consumed.
        if self.plot_index.is_some() {
            return;
        }
        if !transport.has_data() {
            return;
        }
        if let Some(line) = transport.recv_line(50) {
            if let Some(wire::Inbound::Resize(r)) = wire::parse_inbound(&line) {
                self.route(r);
            }
        }
    }

    /// Called at new-page boundaries: reads at most one line.
    pub fn check_incoming(&mut self, transport: &mut Transport) {
        self.drain_one(transport);
    }

    /// Called at host idle: reads at most one more line, then decides
    /// what replay (if any) should happen.
    pub fn poll_resize(&mut self, transport: &mut Transport) -> ResizeAction {
        self.drain_one(transport);

        if let Some(buf) = self.plot_index.take() {
            return ResizeAction::Snapshot { w: buf.w, h: buf.h, index: buf.index };
        }
        if self.has_pending_normal() {
            let action = ResizeAction::CurrentPlot { w: self.pending_w, h: self.pending_h };
            self.pending_w = 0.0;
            self.pending_h = 0.0;
            return action;
        }
        ResizeAction::None
    }

    /// Consumed at the top of `new_page`, before the new page is
    /// allocated, so the next plot starts at the right size.
    pub fn take_pending_for_new_page(&mut self) -> Option<(f64, f64)> {
        if self.has_pending_normal() {
            let dims = (self.pending_w, self.pending_h);
            self.pending_w = 0.0;
            self.pending_h = 0.0;
            Some(dims)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal(w: f64, h: f64) -> wire::Resize {
        wire::Resize { width: w, height: h, plot_index: None }
    }

    fn indexed(w: f64, h: f64, index: u32) -> wire::Resize {
        wire::Resize { width: w, height: h, plot_index: Some(index) }
    }

    #[test]
    fn normal_resize_is_taken_by_poll_with_no_transport_activity() {
        let mut rc = ResizeCoordinator::new();
        rc.route(normal(800.0, 600.0));
        let mut t = Transport::disconnected();
        assert_eq!(rc.poll_resize(&mut t), ResizeAction::CurrentPlot { w: 800.0, h: 600.0 });
        assert_eq!(rc.poll_resize(&mut t), ResizeAction::None);
    }

    #[test]
    fn plot_index_resize_takes_priority_over_pending_normal() {
        let mut rc = ResizeCoordinator::new();
        rc.route(normal(800.0, 600.0));
        rc.route(indexed(640.0, 480.0, 0));
        let mut t = Transport::disconnected();
        assert_eq!(rc.poll_resize(&mut t), ResizeAction::Snapshot { w: 640.0, h: 480.0, index: 0 });
        // the normal resize is still pending afterwards
        assert_eq!(rc.poll_resize(&mut t), ResizeAction::CurrentPlot { w: 800.0, h: 600.0 });
    }

    #[test]
    fn second_plot_index_resize_is_dropped_while_buffered() {
        let mut rc = ResizeCoordinator::new();
        rc.route(indexed(640.0, 480.0, 0));
        rc.route(indexed(100.0, 100.0, 1));
        let mut t = Transport::disconnected();
        assert_eq!(rc.poll_resize(&mut t), ResizeAction::Snapshot { w: 640.0, h: 480.0, index: 0 });
        assert_eq!(rc.poll_resize(&mut t), ResizeAction::None);
    }

    #[test]
    fn new_page_consumes_only_normal_pending() {
        let mut rc = ResizeCoordinator::new();
        rc.route(normal(300.0, 200.0));
        assert_eq!(rc.take_pending_for_new_page(), Some((300.0, 200.0)));
        assert_eq!(rc.take_pending_for_new_page(), None);
    }
}
