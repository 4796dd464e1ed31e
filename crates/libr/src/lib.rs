//
// lib.rs
//
// Copyright (C) 2024 jgd contributors
//
//

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

pub mod graphics;
pub mod types;

pub use graphics::*;
pub use types::*;

extern "C" {
    pub static mut R_NilValue: SEXP;
    pub static mut R_NaString: SEXP;
    pub static mut R_BaseEnv: SEXP;

    pub fn Rf_ScalarLogical(value: std::ffi::c_int) -> SEXP;
    pub fn Rf_ScalarReal(value: f64) -> SEXP;
    pub fn R_registerRoutines(
        info: *mut DllInfo,
        croutines: *const std::ffi::c_void,
        callRoutines: *const R_CallMethodDef,
        fortranRoutines: *const std::ffi::c_void,
        externalRoutines: *const std::ffi::c_void,
    ) -> std::ffi::c_int;

    // Scalar/string coercion and inspection used to pull the `jgd_graphics_device`
    // call arguments (width/height/dpi/address) out of their SEXPs.
    pub fn Rf_asReal(x: SEXP) -> f64;
    pub fn Rf_isNull(x: SEXP) -> Rboolean;
    pub fn Rf_isString(x: SEXP) -> Rboolean;
    pub fn Rf_length(x: SEXP) -> std::ffi::c_int;
    pub fn STRING_ELT(x: SEXP, i: isize) -> SEXP;
    pub fn Rf_translateCharUTF8(x: SEXP) -> *const std::ffi::c_char;

    // `jgd.socket` is read as an R option (`getOption("jgd.socket")`), the
    // same mechanism `options()` itself uses.
    pub fn Rf_install(name: *const std::ffi::c_char) -> SEXP;
    pub fn Rf_GetOption1(tag: SEXP) -> SEXP;

    // Keeps a snapshot SEXP alive across R garbage collections for as long
    // as the snapshot ring holds onto it (`R_PreserveObject`/`R_ReleaseObject`
    // is the engine's own reference-preservation protocol for exactly this
    // purpose -- see `Rf_GetGraphicsParams` callers in `engine.c`).
    pub fn R_PreserveObject(object: SEXP);
    pub fn R_ReleaseObject(object: SEXP);
}
