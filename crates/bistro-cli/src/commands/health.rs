use anyhow::Result;
use serde::Deserialize;

use crate::client::ApiClient;
use crate::config::Config;
use crate::output;

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

pub async fn run(config: &Config) -> Result<()> {
    let client = ApiClient::new(config);
    let resp: HealthResponse = client.get("/health").await?;
    output::print_success(&format!(
        "server at {} reports {}",
        config.server, resp.status
    ));
    Ok(())
}
