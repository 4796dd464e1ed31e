//
// context.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! The device-specific state a `DevDesc` carries through
//! `deviceSpecific`, and the single "which device is ours" slot that the
//! `.Call`-able entry points (spec §6) need to reach it without a `dd`
//! pointer in hand.

use libr::pDevDesc;

use crate::host::RHost;

/// The two halves of a registered device. Split into disjoint fields
/// (rather than one struct with both concerns folded together) so a
/// trampoline can destructure `&mut state` and `&mut host` out of the same
/// allocation and hand them to [`jgd::DeviceState`] methods that expect
/// `&mut impl Host<Snapshot = S>` as a separate borrow.
pub struct JgdDevice {
    pub state: jgd::DeviceState<crate::snapshot::PreservedSexp>,
    pub host: RHost,
}

impl JgdDevice {
    pub fn new(state: jgd::DeviceState<crate::snapshot::PreservedSexp>) -> Self {
        JgdDevice { state, host: RHost::new() }
    }
}

/// The one device this process's embedding R session has open through
/// `jgd_graphics_device()`. A single-threaded host runtime (spec §1, the
/// cooperative concurrency model) only ever has one current jgd device at
/// a time, all access happening on the R main thread, so this is a plain
/// `static mut` rather than a `Mutex` -- a raw `pDevDesc` isn't `Sync`
/// anyway, and the single-thread guarantee makes synchronization moot.
static mut CURRENT: Option<pDevDesc> = None;

/// # Safety
/// Must only be called with the `pDevDesc` just produced for this device,
/// immediately after `GEaddDevice2` registers it, on the R main thread.
pub unsafe fn set_current(dev: pDevDesc) {
    CURRENT = Some(dev);
}

/// # Safety
/// Must only be called on the R main thread.
pub unsafe fn clear_current(dev: pDevDesc) {
    if CURRENT == Some(dev) {
        CURRENT = None;
    }
}

/// # Safety
/// Must only be called on the R main thread.
pub unsafe fn current() -> Option<pDevDesc> {
    CURRENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_current_only_clears_a_matching_device() {
        unsafe {
            let a = 1usize as pDevDesc;
            let b = 2usize as pDevDesc;
            set_current(a);
            clear_current(b);
            assert_eq!(current(), Some(a));
            clear_current(a);
            assert_eq!(current(), None);
        }
    }
}
