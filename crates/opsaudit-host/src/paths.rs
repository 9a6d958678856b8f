//! Where host files are read from.

use std::path::{Path, PathBuf};

/// Resolves well-known absolute paths under a root directory.
///
/// The root is `/` on a real host; tests point it at a temporary
/// directory laid out like one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPaths {
    root: PathBuf,
}

impl Default for HostPaths {
    fn default() -> Self {
        Self::new("/")
    }
}

impl HostPaths {
    /// Resolve paths under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an absolute host path under the root
    #[must_use]
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        self.root.join(path.strip_prefix("/").unwrap_or(path))
    }

    /// `/etc/passwd`
    #[must_use]
    pub fn passwd(&self) -> PathBuf {
        self.resolve("/etc/passwd")
    }

    /// `/etc/sudoers`
    #[must_use]
    pub fn sudoers(&self) -> PathBuf {
        self.resolve("/etc/sudoers")
    }

    /// `/etc/sudoers.d`
    #[must_use]
    pub fn sudoers_dir(&self) -> PathBuf {
        self.resolve("/etc/sudoers.d")
    }

    /// Flat authentication logs (Debian-style, then RHEL-style)
    #[must_use]
    pub fn auth_logs(&self) -> [PathBuf; 2] {
        [
            self.resolve("/var/log/auth.log"),
            self.resolve("/var/log/secure"),
        ]
    }

    /// `/etc/os-release`
    #[must_use]
    pub fn os_release(&self) -> PathBuf {
        self.resolve("/etc/os-release")
    }

    /// Docker daemon socket
    #[must_use]
    pub fn docker_socket(&self) -> PathBuf {
        self.resolve("/var/run/docker.sock")
    }

    /// `authorized_keys` for a home directory
    #[must_use]
    pub fn authorized_keys(&self, home: &str) -> PathBuf {
        self.resolve(home).join(".ssh").join("authorized_keys")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_root_is_identity() {
        let paths = HostPaths::default();
        assert_eq!(paths.passwd(), PathBuf::from("/etc/passwd"));
        assert_eq!(
            paths.authorized_keys("/home/alice"),
            PathBuf::from("/home/alice/.ssh/authorized_keys")
        );
    }

    #[test]
    fn custom_root_prefixes_everything() {
        let paths = HostPaths::new("/tmp/fake");
        assert_eq!(paths.sudoers(), PathBuf::from("/tmp/fake/etc/sudoers"));
        assert_eq!(paths.auth_logs()[1], PathBuf::from("/tmp/fake/var/log/secure"));
        assert_eq!(paths.authorized_keys("/root"), PathBuf::from("/tmp/fake/root/.ssh/authorized_keys"));
    }
}
