//! `authorized_keys` presence per interactive user.

use super::read_lossy;
use crate::paths::HostPaths;
use crate::types::{KeyStatus, UserAccount};

/// Check each user's `~/.ssh/authorized_keys`
pub async fn collect_keys(paths: &HostPaths, users: &[UserAccount]) -> Vec<KeyStatus> {
    let mut out = Vec::with_capacity(users.len());
    for user in users {
        let file = read_lossy(&paths.authorized_keys(&user.home)).await;
        out.push(KeyStatus {
            user: user.name.clone(),
            has_file: file.is_some(),
            key_count: file.as_deref().map_or(0, count_keys),
        });
    }
    out
}

/// Non-blank, non-comment lines
pub fn count_keys(text: &str) -> usize {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .count()
}
