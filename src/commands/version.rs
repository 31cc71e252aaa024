//! Command: print version information.

/// Version string: the git description baked in at build time, or the
/// crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("ENVSETUP_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("envsetup {}", version());
}
