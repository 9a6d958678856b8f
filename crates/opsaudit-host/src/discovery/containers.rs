//! Docker containers.

use super::stdout_of;
use crate::paths::HostPaths;
use crate::types::{Container, ContainerStatus};
use opsaudit_client::CommandRunner;
use tracing::debug;

/// Go template for `docker ps`; docker expands the `\t` itself
const PS_FORMAT: &str = "{{.Names}}\\t{{.Status}}";

/// List containers when the daemon is reachable
pub async fn collect_containers(runner: &dyn CommandRunner, paths: &HostPaths) -> ContainerStatus {
    let socket = paths.docker_socket();
    if !tokio::fs::try_exists(&socket).await.unwrap_or(false) {
        debug!(socket = %socket.display(), "no docker socket");
        return ContainerStatus::default();
    }
    if stdout_of(runner, "docker", &["info"]).await.is_none() {
        return ContainerStatus::default();
    }

    let containers = stdout_of(runner, "docker", &["ps", "-a", "--format", PS_FORMAT])
        .await
        .map(|out| parse_docker_ps(&out))
        .unwrap_or_default();
    ContainerStatus {
        available: true,
        containers,
    }
}

/// Parse `name<TAB>status` lines
pub fn parse_docker_ps(output: &str) -> Vec<Container> {
    output
        .lines()
        .filter_map(|line| {
            let (name, status) = line.split_once('\t')?;
            Some(Container {
                name: name.trim().to_string(),
                status: status.trim().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsaudit_client::ScriptedRunner;

    const PS: &str = "web\tUp 3 hours (healthy)\nworker\tExited (1) 2 days ago\ncache\tUp 3 hours\n";

    #[tokio::test]
    async fn lists_containers_when_daemon_is_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("var/run")).unwrap();
        std::fs::write(dir.path().join("var/run/docker.sock"), "").unwrap();

        let runner = ScriptedRunner::new()
            .stdout("docker info", "Server Version: 24.0.7\n")
            .stdout("docker ps -a --format {{.Names}}\\t{{.Status}}", PS);

        let status = collect_containers(&runner, &HostPaths::new(dir.path())).await;
        assert!(status.available);
        assert_eq!(status.containers.len(), 3);
        let unhealthy: Vec<_> = status.unhealthy().map(|c| c.name.as_str()).collect();
        assert_eq!(unhealthy, vec!["worker"]);
        assert!(!status.all_healthy());
    }

    #[tokio::test]
    async fn no_socket_means_no_docker() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new().stdout("docker info", "ok");
        let status = collect_containers(&runner, &HostPaths::new(dir.path())).await;
        assert!(!status.available);
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn daemon_down_means_no_docker() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("var/run")).unwrap();
        std::fs::write(dir.path().join("var/run/docker.sock"), "").unwrap();
        let runner = ScriptedRunner::new().fail("docker info", 1, "Cannot connect to the Docker daemon");

        let status = collect_containers(&runner, &HostPaths::new(dir.path())).await;
        assert!(!status.available);
    }
}
