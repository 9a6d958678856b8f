//! Lambda endpoints.

use crate::AwsClient;
use opsaudit_core::{Resource, Result};
use serde::Deserialize;

/// Lambda API endpoints
pub struct LambdaApi<'a> {
    client: &'a AwsClient,
}

impl<'a> LambdaApi<'a> {
    pub(crate) fn new(client: &'a AwsClient) -> Self {
        Self { client }
    }

    /// All functions in the region
    pub async fn functions(&self) -> Result<Vec<Resource>> {
        let response: ListFunctions = self.client.call("lambda", "list-functions", &[]).await?;
        Ok(response
            .functions
            .into_iter()
            .map(|f| {
                let runtime = f.runtime.unwrap_or_else(|| "container".to_string());
                let details = match f.memory_size {
                    Some(mb) => format!("{runtime}, {mb} MB"),
                    None => runtime,
                };
                Resource {
                    id: f.function_name,
                    details,
                    state: String::new(),
                    created: f.last_modified,
                }
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListFunctions {
    #[serde(default)]
    functions: Vec<Function>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Function {
    function_name: String,
    #[serde(default)]
    runtime: Option<String>,
    #[serde(default)]
    memory_size: Option<u32>,
    #[serde(default)]
    last_modified: Option<String>,
}
