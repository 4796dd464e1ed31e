//
// host.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! The [`jgd::device::Host`] implementation backing a real device: every
//! method is a thin wrapper over the graphics engine's own snapshot/replay
//! primitives, `GEcreateSnapshot` and `GEplaySnapshot` (the same pair
//! `recordPlot()`/`replayPlot()` use at the R level).

use libr::pGEDevDesc;

use crate::snapshot::PreservedSexp;

pub struct RHost {
    /// Set once, right after `GEaddDevice2` hands back the device's
    /// engine-side wrapper. `None` only during the brief window between
    /// allocating the device-specific state and registering the device.
    pub dd: Option<pGEDevDesc>,
}

impl RHost {
    pub fn new() -> Self {
        RHost { dd: None }
    }

    fn dd(&self) -> pGEDevDesc {
        self.dd.expect("RHost used before the device was registered")
    }
}

impl Default for RHost {
    fn default() -> Self {
        Self::new()
    }
}

impl jgd::device::Host for RHost {
    type Snapshot = PreservedSexp;

    fn capture_snapshot(&mut self) -> PreservedSexp {
        unsafe {
            let sexp = libr::GEcreateSnapshot(self.dd());
            PreservedSexp::new(sexp)
        }
    }

    fn replay_current(&mut self) {
        // Re-issuing the current plot is "take a snapshot of the display
        // list right now, then play it straight back" -- `GEplaySnapshot`
        // replays a snapshot through the device's own drawing callbacks,
        // which is exactly the re-issuance the resize coordinator needs.
        unsafe {
            let dd = self.dd();
            let snapshot = libr::GEcreateSnapshot(dd);
            libr::GEplaySnapshot(snapshot, dd);
        }
    }

    fn replay_snapshot(&mut self, snapshot: &PreservedSexp) {
        unsafe { libr::GEplaySnapshot(snapshot.sexp(), self.dd()) };
    }
}
