//
// unwrap.rs
//
// Copyright (C) 2024 Posit Software, PBC. All rights reserved.
//
//

/// Unwrap a `Result` or `Option`, running the given block on the failure
/// case instead of panicking.
///
/// ```ignore
/// let value = unwrap!(might_fail(), Err(error) => {
///     log::error!("{error}");
///     return;
/// });
/// ```
#[macro_export]
macro_rules! unwrap {
    ($value:expr, Err($err:pat) => $body:expr) => {
        match $value {
            Ok(value) => value,
            Err($err) => $body,
        }
    };
    ($value:expr, None => $body:expr) => {
        match $value {
            Some(value) => value,
            None => $body,
        }
    };
}
