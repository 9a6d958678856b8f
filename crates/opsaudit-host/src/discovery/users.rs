//! Accounts from `/etc/passwd` and passwordless sudo rules.

use super::read_lossy;
use crate::paths::HostPaths;
use crate::types::{UserAccount, UserFindings};
use tracing::debug;

/// Shells that allow an interactive login
const LOGIN_SHELLS: &[&str] = &["bash", "sh", "zsh", "fish", "ksh", "dash", "tcsh", "csh"];

/// Read accounts and sudo rules
pub async fn collect_users(paths: &HostPaths) -> UserFindings {
    let accounts = read_lossy(&paths.passwd())
        .await
        .map(|text| parse_passwd(&text))
        .unwrap_or_default();

    let extra_root = accounts
        .iter()
        .filter(|a| a.uid == 0 && a.name != "root")
        .map(|a| a.name.clone())
        .collect();
    let interactive = accounts.into_iter().filter(has_login_shell).collect();

    UserFindings {
        interactive,
        extra_root,
        nopasswd: collect_nopasswd(paths).await,
    }
}

/// Parse `name:x:uid:gid:gecos:home:shell` lines
pub fn parse_passwd(text: &str) -> Vec<UserAccount> {
    text.lines()
        .filter(|l| !l.trim().is_empty() && !l.starts_with('#'))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(':').collect();
            if fields.len() < 7 {
                return None;
            }
            Some(UserAccount {
                name: fields[0].to_string(),
                uid: fields[2].parse().ok()?,
                home: fields[5].to_string(),
                shell: fields[6].trim().to_string(),
            })
        })
        .collect()
}

fn has_login_shell(account: &UserAccount) -> bool {
    account
        .shell
        .rsplit('/')
        .next()
        .is_some_and(|name| LOGIN_SHELLS.contains(&name))
}

/// `NOPASSWD` rules from `/etc/sudoers` and `/etc/sudoers.d/*`
async fn collect_nopasswd(paths: &HostPaths) -> Vec<String> {
    let mut files = vec![paths.sudoers()];
    match tokio::fs::read_dir(paths.sudoers_dir()).await {
        Ok(mut dir) => {
            let mut extra = Vec::new();
            while let Ok(Some(entry)) = dir.next_entry().await {
                extra.push(entry.path());
            }
            extra.sort();
            files.extend(extra);
        }
        Err(e) => debug!(error = %e, "no sudoers.d"),
    }

    let mut rules = Vec::new();
    for file in files {
        let Some(text) = read_lossy(&file).await else {
            continue;
        };
        let label = file
            .strip_prefix(paths.root())
            .map_or_else(|_| file.display().to_string(), |p| format!("/{}", p.display()));
        rules.extend(
            nopasswd_lines(&text).map(|rule| format!("{label}: {rule}")),
        );
    }
    rules
}

fn nopasswd_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.starts_with('#') && l.contains("NOPASSWD"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const PASSWD: &str = "\
root:x:0:0:root:/root:/bin/bash
daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin
sync:x:4:65534:sync:/bin:/bin/sync
alice:x:1000:1000:Alice,,,:/home/alice:/bin/zsh
toor:x:0:0::/root:/bin/sh
deploy:x:1001:1001::/home/deploy:/usr/bin/git-shell
";

    #[test]
    fn parses_passwd() {
        let accounts = parse_passwd(PASSWD);
        assert_eq!(accounts.len(), 6);
        assert_eq!(accounts[3].name, "alice");
        assert_eq!(accounts[3].uid, 1000);
        assert_eq!(accounts[3].home, "/home/alice");
    }

    #[tokio::test]
    async fn collects_from_fake_root() {
        let dir = tempfile::tempdir().unwrap();
        let etc = dir.path().join("etc");
        fs::create_dir_all(etc.join("sudoers.d")).unwrap();
        fs::write(etc.join("passwd"), PASSWD).unwrap();
        fs::write(
            etc.join("sudoers"),
            "root ALL=(ALL:ALL) ALL\n# %admin ALL=(ALL) NOPASSWD: ALL\n",
        )
        .unwrap();
        fs::write(etc.join("sudoers.d/deploy"), "deploy ALL=(ALL) NOPASSWD: /usr/bin/systemctl\n").unwrap();

        let users = collect_users(&HostPaths::new(dir.path())).await;
        let names: Vec<_> = users.interactive.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["root", "alice", "toor"]);
        assert_eq!(users.extra_root, vec!["toor"]);
        assert_eq!(
            users.nopasswd,
            vec!["/etc/sudoers.d/deploy: deploy ALL=(ALL) NOPASSWD: /usr/bin/systemctl"]
        );
    }

    #[tokio::test]
    async fn missing_files_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let users = collect_users(&HostPaths::new(dir.path())).await;
        assert_eq!(users, UserFindings::default());
    }
}
