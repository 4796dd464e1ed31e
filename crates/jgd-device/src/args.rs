//
// args.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! Pulls the `jgd_graphics_device(width, height, dpi, address)` call
//! arguments out of their `SEXP`s, and reads the `jgd.socket` host option
//! (spec §4.A address discovery, step 2).

use std::ffi::CStr;
use std::ffi::CString;

use libr::SEXP;

/// # Safety
/// `sexp` must be a valid `SEXP` coercible to a real scalar.
pub unsafe fn as_f64(sexp: SEXP) -> f64 {
    libr::Rf_asReal(sexp)
}

/// `NULL`, a zero-length character vector, or `NA_character_` are all
/// "no address supplied" (spec §6 entry point: address is optional).
///
/// # Safety
/// `sexp` must be a valid `SEXP`.
pub unsafe fn as_opt_string(sexp: SEXP) -> Option<String> {
    if libr::Rf_isNull(sexp) != 0 || libr::Rf_length(sexp) == 0 {
        return None;
    }
    let elt = libr::STRING_ELT(sexp, 0);
    if elt == libr::R_NaString {
        return None;
    }
    let ptr = libr::Rf_translateCharUTF8(elt);
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
}

/// `getOption("jgd.socket")`, read the same way `options()` itself is
/// implemented at the C level.
///
/// # Safety
/// Must be called on the R main thread with an initialized R session.
pub unsafe fn host_socket_option() -> Option<String> {
    let name = CString::new("jgd.socket").ok()?;
    let tag = libr::Rf_install(name.as_ptr());
    let value = libr::Rf_GetOption1(tag);
    as_opt_string(value)
}
