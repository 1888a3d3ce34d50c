use std::{
    fs, io,
    path::Path,
};

/// Directory operations the workarounds need from the host.
pub trait Filesystem {
    /// Creates `path` and all missing parents. Succeeds if it already exists.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    /// Removes `path` recursively. Succeeds if it does not exist.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl Filesystem for LocalFs {
    #[inline]
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        match fs::remove_dir_all(path) {
            Err(ref err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            res => res,
        }
    }
}
