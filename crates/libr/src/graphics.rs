//
// graphics.rs
//
// Copyright (C) 2024 jgd contributors
//
//

// This file captures the device description for the R graphics engine, the
// ABI a graphics device must satisfy to be installed as the current device
// via `GEcurrentDevice()` / the `newDevice` constructor pattern.
//
// See also:
//
// https://github.com/wch/r-source/blob/trunk/src/include/R_ext/GraphicsDevice.h
// https://github.com/wch/r-source/blob/trunk/src/include/R_ext/GraphicsEngine.h
//
// Unlike a general-purpose R embedding crate, this binding targets a single
// graphics engine ABI version (the current one as of R 4.3, "version 16").
// Supporting the full run of historical ABI versions (13 through 16, as a
// long-lived IDE backend must, to run against whatever R the user has
// installed) is out of scope for a recorder library; callers are expected to
// refuse to install the device when `R_GE_getVersion()` doesn't match.

#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use crate::Rboolean;
use crate::SEXP;

// ---------------------------------------------------------------------------------------
// Opaque structs used with R API graphics functions
//
// `GEcurrentDevice()` returns a `pGEDevDesc`, which we cast to `pGEDevDesc`
// (the concrete struct below) to reach the nested `pDevDesc` and the
// display-list/snapshot fields. Our callback trampolines are handed
// `pDevDesc` and `pGEcontext` pointers by the engine directly.

#[repr(C)]
pub struct GESystemDesc {
    _data: [u8; 0],
    _marker: core::marker::PhantomData<(*mut u8, core::marker::PhantomPinned)>,
}

/// The graphics engine's wrapper around a device: owns the display list used
/// to replay a plot (on resize, or when copying a plot to a new device) and
/// the most recent snapshot taken of it.
#[repr(C)]
pub struct GEDevDesc {
    pub dev: pDevDesc,
    pub displayListOn: Rboolean,
    pub displayList: SEXP,
    pub DLlastElt: SEXP,
    pub savedSnapshot: SEXP,
    pub dirty: Rboolean,
    pub recordGraphics: Rboolean,
    pub gesd: [*mut GESystemDesc; 24usize],
    pub ask: Rboolean,
    pub appending: Rboolean,
}
pub type pGEDevDesc = *mut GEDevDesc;

/// Line-end style, `R_GE_lineend` in `GraphicsEngine.h`. Maps to gc.lend's
/// `"round" | "butt" | "square"` wire encoding.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum R_GE_lineend {
    GE_ROUND_CAP = 1,
    GE_BUTT_CAP = 2,
    GE_SQUARE_CAP = 3,
}

/// Line-join style, `R_GE_linejoin` in `GraphicsEngine.h`. Maps to gc.ljoin's
/// `"round" | "miter" | "bevel"` wire encoding.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum R_GE_linejoin {
    GE_ROUND_JOIN = 1,
    GE_MITRE_JOIN = 2,
    GE_BEVEL_JOIN = 3,
}

/// The graphics context handed to every drawing callback. Colors are packed
/// `AABBGGRR` unsigned ints (see `color::decode` in `jgd`); `lty` is a
/// nibble-packed dash pattern; `fontface` is 1=plain, 2=bold, 3=italic,
/// 4=bold-italic, 5=symbol, matching spec's gc.font.face encoding.
#[repr(C)]
pub struct R_GE_gcontext {
    pub col: std::ffi::c_uint,
    pub fill: std::ffi::c_uint,
    pub gamma: f64,
    pub lwd: f64,
    pub lty: std::ffi::c_int,
    pub lend: R_GE_lineend,
    pub ljoin: R_GE_linejoin,
    pub lmitre: f64,
    pub cex: f64,
    pub ps: f64,
    pub lineheight: f64,
    pub fontface: std::ffi::c_int,
    pub fontfamily: [std::ffi::c_char; 201usize],
}
pub type pGEcontext = *mut R_GE_gcontext;

// ---------------------------------------------------------------------------------------
// `DevDesc`: the per-device struct a device constructor populates with
// callback pointers. This is the ABI jgd-device implements against; every
// field it doesn't use is still present (and left `None`) because the
// engine reads the whole struct.

#[repr(C)]
pub struct DevDesc {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
    pub clipLeft: f64,
    pub clipRight: f64,
    pub clipBottom: f64,
    pub clipTop: f64,
    pub xCharOffset: f64,
    pub yCharOffset: f64,
    pub yLineBias: f64,
    pub ipr: [f64; 2usize],
    pub cra: [f64; 2usize],
    pub gamma: f64,
    pub canClip: Rboolean,
    pub canChangeGamma: Rboolean,
    pub canHAdj: std::ffi::c_int,
    pub startps: f64,
    pub startcol: std::ffi::c_int,
    pub startfill: std::ffi::c_int,
    pub startlty: std::ffi::c_int,
    pub startfont: std::ffi::c_int,
    pub startgamma: f64,
    pub deviceSpecific: *mut std::ffi::c_void,
    pub displayListOn: Rboolean,
    pub canGenMouseDown: Rboolean,
    pub canGenMouseMove: Rboolean,
    pub canGenMouseUp: Rboolean,
    pub canGenKeybd: Rboolean,
    pub canGenIdle: Rboolean,
    pub gettingEvent: Rboolean,
    pub activate: Option<unsafe extern "C" fn(dd: pDevDesc)>,
    pub circle:
        Option<unsafe extern "C" fn(x: f64, y: f64, r: f64, gc: pGEcontext, dd: pDevDesc)>,
    pub clip: Option<unsafe extern "C" fn(x0: f64, x1: f64, y0: f64, y1: f64, dd: pDevDesc)>,
    pub close: Option<unsafe extern "C" fn(dd: pDevDesc)>,
    pub deactivate: Option<unsafe extern "C" fn(dd: pDevDesc)>,
    pub locator: Option<unsafe extern "C" fn(x: *mut f64, y: *mut f64, dd: pDevDesc) -> Rboolean>,
    pub line: Option<
        unsafe extern "C" fn(x1: f64, y1: f64, x2: f64, y2: f64, gc: pGEcontext, dd: pDevDesc),
    >,
    pub metricInfo: Option<
        unsafe extern "C" fn(
            c: std::ffi::c_int,
            gc: pGEcontext,
            ascent: *mut f64,
            descent: *mut f64,
            width: *mut f64,
            dd: pDevDesc,
        ),
    >,
    pub mode: Option<unsafe extern "C" fn(mode: std::ffi::c_int, dd: pDevDesc)>,
    pub newPage: Option<unsafe extern "C" fn(gc: pGEcontext, dd: pDevDesc)>,
    pub polygon: Option<
        unsafe extern "C" fn(
            n: std::ffi::c_int,
            x: *mut f64,
            y: *mut f64,
            gc: pGEcontext,
            dd: pDevDesc,
        ),
    >,
    pub polyline: Option<
        unsafe extern "C" fn(
            n: std::ffi::c_int,
            x: *mut f64,
            y: *mut f64,
            gc: pGEcontext,
            dd: pDevDesc,
        ),
    >,
    pub rect: Option<
        unsafe extern "C" fn(x0: f64, y0: f64, x1: f64, y1: f64, gc: pGEcontext, dd: pDevDesc),
    >,
    pub path: Option<
        unsafe extern "C" fn(
            x: *mut f64,
            y: *mut f64,
            npoly: std::ffi::c_int,
            nper: *mut std::ffi::c_int,
            winding: Rboolean,
            gc: pGEcontext,
            dd: pDevDesc,
        ),
    >,
    pub raster: Option<
        unsafe extern "C" fn(
            raster: *mut std::ffi::c_uint,
            w: std::ffi::c_int,
            h: std::ffi::c_int,
            x: f64,
            y: f64,
            width: f64,
            height: f64,
            rot: f64,
            interpolate: Rboolean,
            gc: pGEcontext,
            dd: pDevDesc,
        ),
    >,
    pub cap: Option<unsafe extern "C" fn(dd: pDevDesc) -> SEXP>,
    pub size: Option<
        unsafe extern "C" fn(
            left: *mut f64,
            right: *mut f64,
            bottom: *mut f64,
            top: *mut f64,
            dd: pDevDesc,
        ),
    >,
    pub strWidth:
        Option<unsafe extern "C" fn(str: *const std::ffi::c_char, gc: pGEcontext, dd: pDevDesc) -> f64>,
    pub text: Option<
        unsafe extern "C" fn(
            x: f64,
            y: f64,
            str: *const std::ffi::c_char,
            rot: f64,
            hadj: f64,
            gc: pGEcontext,
            dd: pDevDesc,
        ),
    >,
    pub onExit: Option<unsafe extern "C" fn(dd: pDevDesc)>,
    pub getEvent: Option<unsafe extern "C" fn(arg1: SEXP, arg2: *const std::ffi::c_char) -> SEXP>,
    pub newFrameConfirm: Option<unsafe extern "C" fn(dd: pDevDesc) -> Rboolean>,
    pub hasTextUTF8: Rboolean,
    pub textUTF8: Option<
        unsafe extern "C" fn(
            x: f64,
            y: f64,
            str: *const std::ffi::c_char,
            rot: f64,
            hadj: f64,
            gc: pGEcontext,
            dd: pDevDesc,
        ),
    >,
    pub strWidthUTF8:
        Option<unsafe extern "C" fn(str: *const std::ffi::c_char, gc: pGEcontext, dd: pDevDesc) -> f64>,
    pub wantSymbolUTF8: Rboolean,
    pub useRotatedTextInContour: Rboolean,
    pub eventEnv: SEXP,
    pub eventHelper: Option<unsafe extern "C" fn(dd: pDevDesc, code: std::ffi::c_int)>,
    pub holdflush:
        Option<unsafe extern "C" fn(dd: pDevDesc, level: std::ffi::c_int) -> std::ffi::c_int>,
    pub haveTransparency: std::ffi::c_int,
    pub haveTransparentBg: std::ffi::c_int,
    pub haveRaster: std::ffi::c_int,
    pub haveCapture: std::ffi::c_int,
    pub haveLocator: std::ffi::c_int,
    pub setPattern: Option<unsafe extern "C" fn(pattern: SEXP, dd: pDevDesc) -> SEXP>,
    pub releasePattern: Option<unsafe extern "C" fn(r#ref: SEXP, dd: pDevDesc)>,
    pub setClipPath: Option<unsafe extern "C" fn(path: SEXP, r#ref: SEXP, dd: pDevDesc) -> SEXP>,
    pub releaseClipPath: Option<unsafe extern "C" fn(r#ref: SEXP, dd: pDevDesc)>,
    pub setMask: Option<unsafe extern "C" fn(path: SEXP, r#ref: SEXP, dd: pDevDesc) -> SEXP>,
    pub releaseMask: Option<unsafe extern "C" fn(r#ref: SEXP, dd: pDevDesc)>,
    pub deviceVersion: std::ffi::c_int,
    pub deviceClip: Rboolean,
    pub reserved: [std::ffi::c_char; 64usize],
}
pub type pDevDesc = *mut DevDesc;

// ---------------------------------------------------------------------------------------
// Entry points into the graphics engine. jgd-device links against these
// directly -- the engine's symbols are already present in the embedding R
// process by the time a package DLL/so is dlopen'd into it, so there's no
// need to resolve them dynamically at runtime for a device that already
// pins a single engine version via `R_GE_getVersion()`.
extern "C" {
    pub fn R_GE_getVersion() -> std::ffi::c_int;
    pub fn GEcurrentDevice() -> pGEDevDesc;
    pub fn GEinitDisplayList(dd: pGEDevDesc);
    pub fn GEcreateSnapshot(dd: pGEDevDesc) -> SEXP;
    pub fn GEplaySnapshot(snapshot: SEXP, dd: pGEDevDesc);
    pub fn GEaddDevice2(dd: pGEDevDesc, name: *const std::ffi::c_char);
    pub fn GEkillDevice(dd: pGEDevDesc);

    /// Wraps a freshly built `pDevDesc` in the engine's `GEDevDesc`
    /// envelope (display list, snapshot slot, ...); the result is what
    /// `GEaddDevice2` expects.
    pub fn GEcreateDevDesc(dev: pDevDesc) -> pGEDevDesc;
    pub fn Rf_ndevNumber(dd: pDevDesc) -> std::ffi::c_int;
    pub fn Rf_selectDevice(which: std::ffi::c_int) -> Rboolean;
}
