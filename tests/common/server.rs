//! Test server management.
//!
//! Spawns and manages relayd instances for integration testing.

use std::path::Path;
use std::process::{Child, Command};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

/// Path of the binary under test.
pub fn binary() -> &'static str {
    env!("CARGO_BIN_EXE_relayd")
}

/// Argon2 hash of `password`, produced by the daemon's own `--genpasswd`.
#[allow(dead_code)]
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let output = Command::new(binary()).args(["--genpasswd", password]).output()?;
    if !output.status.success() {
        anyhow::bail!("--genpasswd failed: {:?}", output.status);
    }
    Ok(String::from_utf8(output.stdout)?.trim().to_string())
}

/// Limits that stay out of the way of ordinary tests.
pub const RELAXED_LIMITS: &str = "message_rate = 1000\nmessage_burst = 1000\nregistration_timeout_secs = 2";

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    // Removed on drop.
    _data_dir: TempDir,
}

impl TestServer {
    /// Spawn a server with the default test configuration.
    pub async fn spawn(port: u16) -> anyhow::Result<Self> {
        Self::spawn_with(port, RELAXED_LIMITS, "").await
    }

    /// Spawn a server with `limits` as the body of `[limits]` and `extra`
    /// appended to the generated configuration.
    pub async fn spawn_with(port: u16, limits: &str, extra: &str) -> anyhow::Result<Self> {
        let data_dir = tempfile::tempdir()?;
        let config_path = data_dir.path().join("relayd.toml");
        let config_content = format!(
            r#"
[server]
name = "chat.local"
hostname = "chat.local"
sid = "00T"

[listen]
address = "127.0.0.1:{port}"

[database]
path = "{db}"

[limits]
{limits}
{extra}
"#,
            db = data_dir.path().join("test.db").display(),
        );
        std::fs::write(&config_path, config_content)?;

        let child = spawn_binary(&config_path)?;
        let server = Self {
            child,
            port,
            _data_dir: data_dir,
        };
        server.wait_until_ready().await?;
        Ok(server)
    }

    /// Wait until the server is accepting connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 5 seconds")
    }

    /// Get the server address.
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Connect a client that has not registered yet.
    pub async fn connect(&self, nick: &str) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.address(), nick).await
    }

    /// Connect and register, discarding the welcome burst.
    #[allow(dead_code)]
    pub async fn register(&self, nick: &str) -> anyhow::Result<super::client::TestClient> {
        let mut client = self.connect(nick).await?;
        client.register().await?;
        Ok(client)
    }
}

fn spawn_binary(config_path: &Path) -> anyhow::Result<Child> {
    Ok(Command::new(binary())
        .arg("--conf")
        .arg(config_path)
        .env("RUST_LOG", "warn")
        .spawn()?)
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
