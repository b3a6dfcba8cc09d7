//! Veridex CLI client — submits text to a running server and renders the
//! verdict. Drives the same single-flight tracker a GUI would.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use veridex_common::{AnalysisError, AnalysisResult, ErrorKind};
use veridex_client::state::{RequestState, RequestTracker};

#[derive(Parser)]
#[command(name = "veridex", about = "Classify news text as Real or Fake")]
struct Args {
    /// Text to analyze; reads stdin when neither this nor --file is given
    text: Option<String>,

    /// Read the text from a file instead
    #[arg(long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Server base URL
    #[arg(long, default_value = "http://127.0.0.1:5050")]
    server: String,

    /// Client-side cap on the whole round trip
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args = Args::parse();
    let text = read_text(&args)?;

    let mut tracker = RequestTracker::new();
    let Some(generation) = tracker.begin() else {
        anyhow::bail!("a request is already in flight");
    };

    let outcome = submit(&args.server, args.timeout_secs, &text).await;
    tracker.complete(generation, outcome);

    match tracker.state() {
        RequestState::Succeeded(result) => {
            println!("{}", result.label.as_str().to_uppercase());
            println!("Confidence: {:.2}%", result.confidence * 100.0);
            println!("{}", result.reasoning);
            Ok(())
        }
        RequestState::Failed(err) => {
            eprintln!("Analysis failed ({}): {}", err.kind.as_str(), err.message);
            if err.kind.is_retryable() {
                eprintln!("This looks transient — try again.");
            }
            std::process::exit(1);
        }
        // begin() succeeded and complete() used its token
        RequestState::Idle | RequestState::Pending => anyhow::bail!("request did not resolve"),
    }
}

fn read_text(args: &Args) -> anyhow::Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    if let Some(path) = &args.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

/// One POST /analyze round trip, mapped into the error taxonomy so the
/// tracker always resolves to a structured terminal state.
async fn submit(
    server: &str,
    timeout_secs: u64,
    text: &str,
) -> Result<AnalysisResult, AnalysisError> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| {
            AnalysisError::new(ErrorKind::UnknownError, "Could not build the HTTP client")
                .with_detail(e.to_string())
        })?;

    let url = format!("{}/analyze", server.trim_end_matches('/'));
    let resp = client
        .post(&url)
        .json(&serde_json::json!({ "text": text }))
        .send()
        .await
        .map_err(|e| {
            let kind = if e.is_timeout() || e.is_connect() {
                ErrorKind::TimeoutError
            } else {
                ErrorKind::UnknownError
            };
            AnalysisError::new(kind, "Could not reach the Veridex server")
                .with_detail(e.to_string())
        })?;

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.map_err(|e| {
        AnalysisError::new(ErrorKind::SchemaError, "Server returned a malformed response")
            .with_detail(e.to_string())
    })?;

    if status.is_success() {
        return serde_json::from_value(body).map_err(|e| {
            AnalysisError::new(ErrorKind::SchemaError, "Server returned a malformed result")
                .with_detail(e.to_string())
        });
    }

    let message = body["message"]
        .as_str()
        .or_else(|| body["error"].as_str())
        .unwrap_or("Analysis failed")
        .to_string();
    let kind = if status.as_u16() == 400 {
        ErrorKind::ValidationError
    } else {
        ErrorKind::UnknownError
    };
    Err(AnalysisError::new(kind, message).with_detail(format!("HTTP {status}")))
}
