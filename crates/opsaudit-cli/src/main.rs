//! opsaudit - AWS cost and Linux security checks for operators.

use anyhow::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    opsaudit_cli::run().await
}
