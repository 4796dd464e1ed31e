//
// snapshot.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! A host-preserved `SEXP` snapshot handle (spec §3, §9 "Opaque host
//! handles"). `jgd::SnapshotStore` only knows how to hold and evict a `S`;
//! this is the concrete `S` the R adapter plugs in, keeping the snapshot
//! alive across garbage collections for as long as it is held.

use libr::SEXP;

pub struct PreservedSexp(SEXP);

impl PreservedSexp {
    /// # Safety
    /// `sexp` must be a valid `SEXP` returned by `GEcreateSnapshot`.
    pub unsafe fn new(sexp: SEXP) -> Self {
        libr::R_PreserveObject(sexp);
        PreservedSexp(sexp)
    }

    pub fn sexp(&self) -> SEXP {
        self.0
    }
}

impl Drop for PreservedSexp {
    fn drop(&mut self) {
        unsafe { libr::R_ReleaseObject(self.0) };
    }
}
