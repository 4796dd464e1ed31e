//
// dev_desc.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! Builds the `DevDesc` the graphics engine is handed at device creation
//! (spec §4.D, §6 "open the device"). Every callback slot points at one
//! of the trampolines in [`crate::callbacks`]; every non-callback field
//! is a constant drawn from the values the in-tree R devices (`cairo`,
//! `postscript`, `svg`) all agree on for a screen-like, non-interactive
//! device -- this crate installs its own device rather than monkey-
//! patching an existing one, so these fields have no other source to
//! read them from.

use libr::pDevDesc;
use libr::DevDesc;
use libr::Rboolean_FALSE;
use libr::Rboolean_TRUE;

use crate::callbacks;
use crate::context::JgdDevice;

/// Opaque color sentinel for "no color" (`NA_INTEGER` reinterpreted),
/// matching `convert::R_NA_COLOR`.
const NA_COLOR: std::ffi::c_int = 0x8000_0000u32 as i32;
const BLACK: std::ffi::c_int = 0xff00_0000u32 as i32;

/// Allocate a `DevDesc` wired to the given device state, and return the
/// raw pointer the engine will own from here on (freed by
/// [`callbacks::gd_close`]).
pub fn build(width_px: f64, height_px: f64, dpi: f64, device: Box<JgdDevice>) -> pDevDesc {
    let pointsize = 12.0;
    let dev = DevDesc {
        left: 0.0,
        right: width_px,
        bottom: height_px,
        top: 0.0,
        clipLeft: 0.0,
        clipRight: width_px,
        clipBottom: height_px,
        clipTop: 0.0,
        xCharOffset: 0.4900,
        yCharOffset: 0.3333,
        yLineBias: 0.2,
        ipr: [1.0 / dpi, 1.0 / dpi],
        cra: [0.9 * pointsize * dpi / 72.0, 1.2 * pointsize * dpi / 72.0],
        gamma: 1.0,
        canClip: Rboolean_TRUE,
        canChangeGamma: Rboolean_FALSE,
        canHAdj: 2,
        startps: pointsize,
        startcol: BLACK,
        startfill: NA_COLOR,
        startlty: 0,
        startfont: 1,
        startgamma: 1.0,
        deviceSpecific: Box::into_raw(device) as *mut std::ffi::c_void,
        displayListOn: Rboolean_TRUE,
        canGenMouseDown: Rboolean_FALSE,
        canGenMouseMove: Rboolean_FALSE,
        canGenMouseUp: Rboolean_FALSE,
        canGenKeybd: Rboolean_FALSE,
        canGenIdle: Rboolean_FALSE,
        gettingEvent: Rboolean_FALSE,
        activate: Some(callbacks::gd_activate),
        circle: Some(callbacks::gd_circle),
        clip: Some(callbacks::gd_clip),
        close: Some(callbacks::gd_close),
        deactivate: Some(callbacks::gd_deactivate),
        locator: Some(callbacks::gd_locator),
        line: Some(callbacks::gd_line),
        metricInfo: Some(callbacks::gd_metric_info),
        mode: Some(callbacks::gd_mode),
        newPage: Some(callbacks::gd_new_page),
        polygon: Some(callbacks::gd_polygon),
        polyline: Some(callbacks::gd_polyline),
        rect: Some(callbacks::gd_rect),
        path: Some(callbacks::gd_path),
        raster: Some(callbacks::gd_raster),
        cap: Some(callbacks::gd_cap),
        size: Some(callbacks::gd_size),
        strWidth: Some(callbacks::gd_str_width),
        text: Some(callbacks::gd_text),
        onExit: Some(callbacks::gd_on_exit),
        getEvent: Some(callbacks::gd_get_event),
        newFrameConfirm: Some(callbacks::gd_new_frame_confirm),
        hasTextUTF8: Rboolean_TRUE,
        textUTF8: Some(callbacks::gd_text),
        strWidthUTF8: Some(callbacks::gd_str_width),
        wantSymbolUTF8: Rboolean_TRUE,
        useRotatedTextInContour: Rboolean_FALSE,
        eventEnv: unsafe { libr::R_NilValue },
        eventHelper: Some(callbacks::gd_event_helper),
        holdflush: Some(callbacks::gd_holdflush),
        haveTransparency: 2,
        haveTransparentBg: 2,
        haveRaster: 2,
        haveCapture: 1,
        haveLocator: 1,
        setPattern: None,
        releasePattern: None,
        setClipPath: None,
        releaseClipPath: None,
        setMask: None,
        releaseMask: None,
        deviceVersion: 16,
        deviceClip: Rboolean_FALSE,
        reserved: [0; 64],
    };
    Box::into_raw(Box::new(dev))
}
