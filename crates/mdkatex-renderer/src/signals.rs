//! Maps signal numbers to their canonical names.

/// Returns the platform name for `signal`, for example `SIGTERM` for 15.
#[cfg(unix)]
#[must_use]
pub fn signal_name(signal: i32) -> Option<&'static str> {
    nix::sys::signal::Signal::try_from(signal)
        .ok()
        .map(nix::sys::signal::Signal::as_str)
}

/// Returns the platform name for `signal`; no table exists off Unix.
#[cfg(not(unix))]
#[must_use]
pub const fn signal_name(_signal: i32) -> Option<&'static str> {
    None
}
