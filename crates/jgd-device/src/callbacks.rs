//
// callbacks.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! The `extern "C"` trampolines patched into a newly-created `DevDesc`
//! (spec §4.D). Each one recovers the [`JgdDevice`] from
//! `dev.deviceSpecific`, translates its arguments into a `jgd::ops` call,
//! and forwards to [`jgd::DeviceState`]. None of these ever panics or lets
//! an R-level longjmp propagate back through Rust frames (spec §7: a
//! protocol fault is logged, never fatal).

use libr::pDevDesc;
use libr::pGEcontext;
use libr::Rboolean;
use libr::SEXP;

use crate::context;
use crate::context::JgdDevice;
use crate::convert::gc_from_engine;
use crate::convert::rgba_from_raster;

unsafe fn device_mut<'a>(dev: pDevDesc) -> &'a mut JgdDevice {
    &mut *((*dev).deviceSpecific as *mut JgdDevice)
}

pub extern "C" fn gd_activate(_dev: pDevDesc) {}

pub extern "C" fn gd_deactivate(_dev: pDevDesc) {}

pub unsafe extern "C" fn gd_close(dev: pDevDesc) {
    let mut device = Box::from_raw((*dev).deviceSpecific as *mut JgdDevice);
    device.state.close(&mut device.host);
    drop(device);
    context::clear_current(dev);
    // jgd allocates its own DevDesc (dev_desc.rs) rather than patching an
    // existing device, so it's responsible for freeing that allocation here.
    drop(Box::from_raw(dev));
}

pub unsafe extern "C" fn gd_clip(x0: f64, x1: f64, y0: f64, y1: f64, dev: pDevDesc) {
    device_mut(dev).state.clip(x0, y0, x1, y1);
}

pub unsafe extern "C" fn gd_line(x1: f64, y1: f64, x2: f64, y2: f64, gc: pGEcontext, dev: pDevDesc) {
    device_mut(dev).state.line(x1, y1, x2, y2, gc_from_engine(gc));
}

pub unsafe extern "C" fn gd_polyline(n: i32, x: *mut f64, y: *mut f64, gc: pGEcontext, dev: pDevDesc) {
    let n = n.max(0) as usize;
    let xs = std::slice::from_raw_parts(x, n).to_vec();
    let ys = std::slice::from_raw_parts(y, n).to_vec();
    device_mut(dev).state.polyline(xs, ys, gc_from_engine(gc));
}

pub unsafe extern "C" fn gd_polygon(n: i32, x: *mut f64, y: *mut f64, gc: pGEcontext, dev: pDevDesc) {
    let n = n.max(0) as usize;
    let xs = std::slice::from_raw_parts(x, n).to_vec();
    let ys = std::slice::from_raw_parts(y, n).to_vec();
    device_mut(dev).state.polygon(xs, ys, gc_from_engine(gc));
}

pub unsafe extern "C" fn gd_rect(x0: f64, y0: f64, x1: f64, y1: f64, gc: pGEcontext, dev: pDevDesc) {
    device_mut(dev).state.rect(x0, y0, x1, y1, gc_from_engine(gc));
}

pub unsafe extern "C" fn gd_circle(x: f64, y: f64, r: f64, gc: pGEcontext, dev: pDevDesc) {
    device_mut(dev).state.circle(x, y, r, gc_from_engine(gc));
}

pub unsafe extern "C" fn gd_text(
    x: f64,
    y: f64,
    str_: *const std::ffi::c_char,
    rot: f64,
    hadj: f64,
    gc: pGEcontext,
    dev: pDevDesc,
) {
    let text = std::ffi::CStr::from_ptr(str_).to_string_lossy().into_owned();
    device_mut(dev).state.text(x, y, text, rot, hadj, gc_from_engine(gc));
}

pub unsafe extern "C" fn gd_path(
    x: *mut f64,
    y: *mut f64,
    npoly: i32,
    nper: *mut i32,
    winding: Rboolean,
    gc: pGEcontext,
    dev: pDevDesc,
) {
    let npoly = npoly.max(0) as usize;
    let counts = std::slice::from_raw_parts(nper, npoly);
    let mut subpaths = Vec::with_capacity(npoly);
    let mut offset = 0isize;
    for &count in counts {
        let count = count.max(0) as usize;
        let mut points = Vec::with_capacity(count);
        for i in 0..count {
            points.push((*x.offset(offset + i as isize), *y.offset(offset + i as isize)));
        }
        offset += count as isize;
        subpaths.push(points);
    }
    let winding = if winding != 0 { jgd::ops::Winding::NonZero } else { jgd::ops::Winding::EvenOdd };
    device_mut(dev).state.path(subpaths, winding, gc_from_engine(gc));
}

pub unsafe extern "C" fn gd_raster(
    raster: *mut std::ffi::c_uint,
    w: i32,
    h: i32,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rot: f64,
    interpolate: Rboolean,
    _gc: pGEcontext,
    dev: pDevDesc,
) {
    let (pw, ph) = (w.max(0) as u32, h.max(0) as u32);
    let rgba = rgba_from_raster(raster, pw as usize, ph as usize);
    device_mut(dev).state.raster(x, y, width, height, rot, interpolate != 0, pw, ph, &rgba);
}

pub unsafe extern "C" fn gd_size(left: *mut f64, right: *mut f64, bottom: *mut f64, top: *mut f64, dev: pDevDesc) {
    let (l, r, b, t) = device_mut(dev).state.size();
    *left = l;
    *right = r;
    *bottom = b;
    *top = t;
}

pub unsafe extern "C" fn gd_str_width(str_: *const std::ffi::c_char, gc: pGEcontext, dev: pDevDesc) -> f64 {
    let text = std::ffi::CStr::from_ptr(str_).to_string_lossy();
    let font = gc_from_engine(gc).font;
    device_mut(dev).state.str_width(&text, &font)
}

pub unsafe extern "C" fn gd_metric_info(
    c: i32,
    gc: pGEcontext,
    ascent: *mut f64,
    descent: *mut f64,
    width: *mut f64,
    dev: pDevDesc,
) {
    let ch = char::from_u32(c.unsigned_abs()).unwrap_or(' ');
    let font = gc_from_engine(gc).font;
    let (a, d, w) = device_mut(dev).state.metric_info(ch, &font);
    *ascent = a;
    *descent = d;
    *width = w;
}

pub unsafe extern "C" fn gd_mode(mode: i32, dev: pDevDesc) {
    let device = device_mut(dev);
    device.state.mode(mode, &mut device.host);
}

pub unsafe extern "C" fn gd_new_page(gc: pGEcontext, dev: pDevDesc) {
    let device = device_mut(dev);
    device.state.check_incoming();
    let bg = gc_from_engine(gc).fill;
    device.state.new_page(bg, &mut device.host);
}

pub unsafe extern "C" fn gd_holdflush(dev: pDevDesc, level: i32) -> i32 {
    let device = device_mut(dev);
    device.state.holdflush(level, &mut device.host);
    device.state.hold_level()
}

pub extern "C" fn gd_locator(_x: *mut f64, _y: *mut f64, _dev: pDevDesc) -> Rboolean {
    0
}

pub unsafe extern "C" fn gd_cap(_dev: pDevDesc) -> SEXP {
    libr::R_NilValue
}

pub extern "C" fn gd_on_exit(_dev: pDevDesc) {}

pub unsafe extern "C" fn gd_get_event(data: SEXP, _name: *const std::ffi::c_char) -> SEXP {
    data
}

pub extern "C" fn gd_new_frame_confirm(_dev: pDevDesc) -> Rboolean {
    1
}

pub extern "C" fn gd_event_helper(_dev: pDevDesc, _code: i32) {}
