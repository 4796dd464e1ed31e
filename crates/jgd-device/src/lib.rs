//
// lib.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! The R adapter for `jgd`: translates the host statistical runtime's
//! `DevDesc`/`GEcontext` callback ABI into calls on [`jgd::DeviceState`],
//! and exposes the two `.Call`-able entry points an embedding R package
//! installs and drives the recorder with (spec §6).
//!
//! This crate builds and registers its own `DevDesc` from scratch
//! (`dev_desc::build`) rather than monkey-patching callbacks onto an
//! already-created device, so every drawing primitive is captured
//! directly --not just lifecycle hooks-- with nothing drawn to a real
//! surface.

pub mod args;
pub mod callbacks;
pub mod context;
pub mod convert;
pub mod dev_desc;
pub mod host;
pub mod snapshot;

use anyhow::bail;
use libr::pDevDesc;
use libr::SEXP;

use context::JgdDevice;

/// The graphics engine ABI version this binding targets (spec §9, "a
/// recorder library... refuses to install the device when
/// `R_GE_getVersion()` doesn't match", matching `libr::graphics`'s single-
/// version scope).
const SUPPORTED_GE_VERSION: std::ffi::c_int = 16;

unsafe fn graphics_device_impl(width: SEXP, height: SEXP, dpi: SEXP, address: SEXP) -> anyhow::Result<()> {
    let width_in = args::as_f64(width);
    let height_in = args::as_f64(height);
    let dpi = args::as_f64(dpi);
    if !(width_in > 0.0 && height_in > 0.0 && dpi > 0.0) {
        bail!("width, height, and dpi must all be positive");
    }

    let version = libr::R_GE_getVersion();
    if version != SUPPORTED_GE_VERSION {
        bail!("R graphics engine version {version} is not supported by this build of jgd");
    }

    let explicit = args::as_opt_string(address);
    let host_option = args::host_socket_option();
    let source = if explicit.is_some() {
        "explicit argument"
    } else if std::env::var("JGD_SOCKET").is_ok() {
        "JGD_SOCKET"
    } else if host_option.is_some() {
        "jgd.socket option"
    } else {
        "discovery file"
    };

    let transport = match jgd::transport::addr::resolve(explicit.as_deref(), host_option.as_deref()) {
        Ok(resolved) => {
            log::trace!("jgd: connecting to {resolved} (via {source})");
            stdext::unwrap!(jgd::transport::Transport::connect(&resolved), Err(error) => {
                log::warn!("jgd: failed to connect to {resolved}: {error}");
                jgd::transport::Transport::disconnected()
            })
        },
        Err(error) => {
            log::warn!("jgd: {error}; drawing on this device will have no visible effect");
            jgd::transport::Transport::disconnected()
        },
    };

    let width_px = width_in * dpi;
    let height_px = height_in * dpi;
    let state = jgd::DeviceState::new(width_in, height_in, dpi, transport);
    let device = Box::new(JgdDevice::new(state));
    let dev = dev_desc::build(width_px, height_px, dpi, device);

    let name = b"jgd\0".as_ptr() as *const std::ffi::c_char;
    let gedev = libr::GEcreateDevDesc(dev);
    libr::GEaddDevice2(gedev, name);
    libr::GEinitDisplayList(gedev);
    context::set_current(dev);

    Ok(())
}

/// `.Call`-able: `jgd_graphics_device(width, height, dpi, address)`
/// (spec §6 "open the device"). Never raises an R error on failure --
/// a connect failure is a logged warning and a no-op device (spec §7).
///
/// # Safety
/// Must be called from R via `.Call` with the documented argument types,
/// on the R main thread.
#[no_mangle]
pub unsafe extern "C" fn jgd_graphics_device(width: SEXP, height: SEXP, dpi: SEXP, address: SEXP) -> SEXP {
    if let Err(error) = graphics_device_impl(width, height, dpi, address) {
        log::warn!("jgd: {error}");
    }
    libr::R_NilValue
}

/// `.Call`-able: `jgd_poll_resize()` (spec §6 "poll-resize"). Returns a
/// logical indicating whether a resize was applied; safe to call when no
/// jgd device is current.
///
/// # Safety
/// Must be called from R via `.Call`, on the R main thread.
#[no_mangle]
pub unsafe extern "C" fn jgd_poll_resize() -> SEXP {
    let applied = match context::current() {
        Some(dev) => poll_resize_for(dev),
        None => false,
    };
    libr::Rf_ScalarLogical(applied as std::ffi::c_int)
}

unsafe fn poll_resize_for(dev: pDevDesc) -> bool {
    let device = &mut *((*dev).deviceSpecific as *mut JgdDevice);
    device.state.poll_resize(&mut device.host)
}

/// Registers the two `.Call` routines above with R's native symbol table.
/// R calls `R_init_<pkgname>` automatically when the shared library is
/// `dlopen`'d.
///
/// # Safety
/// Must only be called once, by R itself, at package load time.
#[no_mangle]
pub unsafe extern "C" fn R_init_jgd(info: *mut libr::DllInfo) {
    let entries: [libr::R_CallMethodDef; 3] = [
        libr::R_CallMethodDef {
            name: b"jgd_graphics_device\0".as_ptr() as *const std::ffi::c_char,
            fun: Some(std::mem::transmute::<
                unsafe extern "C" fn(SEXP, SEXP, SEXP, SEXP) -> SEXP,
                unsafe extern "C" fn() -> SEXP,
            >(jgd_graphics_device)),
            numArgs: 4,
        },
        libr::R_CallMethodDef {
            name: b"jgd_poll_resize\0".as_ptr() as *const std::ffi::c_char,
            fun: Some(std::mem::transmute::<
                unsafe extern "C" fn() -> SEXP,
                unsafe extern "C" fn() -> SEXP,
            >(jgd_poll_resize)),
            numArgs: 0,
        },
        libr::R_CallMethodDef { name: std::ptr::null(), fun: None, numArgs: 0 },
    ];

    let registered = libr::R_registerRoutines(
        info,
        std::ptr::null(),
        entries.as_ptr(),
        std::ptr::null(),
        std::ptr::null(),
    );
    if registered == 0 {
        log::error!("jgd: failed to register native routines");
    }
}
