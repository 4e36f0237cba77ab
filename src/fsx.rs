// Cross-platform filesystem shim: a thin wrapper around `std::fs` so the
// rest of the crate doesn't sprinkle `#[cfg(unix)]` at every mode-setting
// call site.
//
// * On Unix platforms, sets real POSIX mode bits.
// * On Windows (and other non-Unix platforms), this is a no-op.

use std::io;
use std::path::Path;

#[cfg(unix)]
pub fn set_unix_permissions(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
#[inline]
pub fn set_unix_permissions(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
