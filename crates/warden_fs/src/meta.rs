use std::io;
use std::path::Path;

impl crate::WardenFS {
    /// Permission probe: `Some(mode)` when the path exists and its
    /// others-read bit is cleared.
    ///
    /// A missing path is `Ok(None)` so that decisions about
    /// not-yet-existing files fall through to the pattern catalog; every
    /// other stat failure propagates for the caller to deny on.
    #[cfg(unix)]
    pub fn restrictive_mode(path: &Path) -> io::Result<Option<u32>> {
        use std::os::unix::fs::PermissionsExt;

        match std::fs::metadata(path) {
            Ok(meta) => {
                let mode = meta.permissions().mode() & 0o777;
                Ok((mode & 0o004 == 0).then_some(mode))
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error),
        }
    }

    #[cfg(not(unix))]
    pub fn restrictive_mode(_path: &Path) -> io::Result<Option<u32>> {
        Ok(None)
    }
}
