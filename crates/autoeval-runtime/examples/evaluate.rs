//! Evaluate one claim against a ground truth and print the report.
//!
//! Credentials come from the provider's environment variable, e.g.
//! `OPENAI_API_KEY=... cargo run --example evaluate`.

use autoeval_runtime::{evaluate, EvalConfig, Provider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "autoeval_runtime=info".into()),
        )
        .init();

    let config = EvalConfig::new(Provider::Openai);
    let report = evaluate(
        "The sky is blue. The sun is bright. Birds can fly.",
        "The sky is blue. Birds can fly.",
        &config,
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
