use std::env;
use std::sync::Arc;

use anyhow::Context;

use ragpipe::backends::{AzureOpenAiClient, AzureSearchClient};
use ragpipe::{AppConfig, PipelineError, RagPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path =
        env::var("RAGPIPE_CONFIG").unwrap_or_else(|_| "ragpipe.toml".to_string());
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("failed to load config from {config_path}"))?;

    ragpipe::logging::init(config.logging.dir.as_deref());

    let question = env::args().skip(1).collect::<Vec<_>>().join(" ");

    let search = Arc::new(AzureSearchClient::new(&config.search)?);
    let openai = Arc::new(AzureOpenAiClient::new(&config.openai)?);
    let pipeline = RagPipeline::from_config(&config, search, openai.clone(), openai);

    match pipeline.answer(&question).await {
        Ok(result) => {
            println!("{}", result.text);
            Ok(())
        }
        Err(PipelineError::InvalidInput) => {
            eprintln!("usage: ragpipe <question>");
            std::process::exit(2);
        }
    }
}
