use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use crate::config::ReviewConfig;
use crate::pipeline::adjudication::{ClaimReviewer, TelangiectasiaPolicy};
use crate::pipeline::document::load_record;
use crate::pipeline::llm::{LlmClient, OllamaClient, RetryingLlmClient};

#[derive(Parser, Debug)]
#[command(name = "priorauth", author, version, about, long_about = None)]
pub struct Args {
    /// Medical record to review (.docx, .txt or .md)
    pub record_file: PathBuf,
    /// Where the CSV report is written
    pub output_file: PathBuf,
    /// Procedure code under review
    #[arg(short = 'c', long)]
    pub cpt: Option<u32>,
    /// Retrieval score a passage must exceed to count as corroboration
    #[arg(short = 'm', long, alias = "match_threshold")]
    pub match_threshold: Option<f32>,
    /// Year the record was written; ages are computed against it
    #[arg(short = 'y', long, alias = "record_year")]
    pub record_year: Option<i32>,
    /// Extraction model name
    #[arg(long)]
    pub model: Option<String>,
    /// Ollama base URL
    #[arg(long)]
    pub ollama_url: Option<String>,
    /// Which answer gates the Telangiectasia corroboration query
    #[arg(long, value_enum)]
    pub telangiectasia_gate: Option<TelangiectasiaGate>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TelangiectasiaGate {
    Own,
    AbdominalPain,
}

impl From<TelangiectasiaGate> for TelangiectasiaPolicy {
    fn from(gate: TelangiectasiaGate) -> Self {
        match gate {
            TelangiectasiaGate::Own => Self::OwnAnswer,
            TelangiectasiaGate::AbdominalPain => Self::AbdominalPainAnswer,
        }
    }
}

impl Args {
    /// Flags take precedence over the environment and defaults.
    pub fn apply(&self, mut config: ReviewConfig) -> ReviewConfig {
        if let Some(cpt) = self.cpt {
            config.cpt = cpt;
        }
        if let Some(threshold) = self.match_threshold {
            config.match_threshold = threshold;
        }
        if let Some(year) = self.record_year {
            config.record_year = year;
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(url) = &self.ollama_url {
            config.ollama_url = url.clone();
        }
        if let Some(gate) = self.telangiectasia_gate {
            config.telangiectasia_policy = gate.into();
        }
        config
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = args.apply(ReviewConfig::from_env());
    if !config.match_threshold.is_finite() {
        bail!("match threshold must be a finite number");
    }
    tracing::debug!(config = %serde_json::to_string(&config)?, "effective configuration");

    let ollama = OllamaClient::new(&config.ollama_url, config.llm_timeout())
        .context("failed to build extraction service client")?;
    let client = RetryingLlmClient::new(ollama, config.retry);
    let available = client
        .is_model_available(&config.model)
        .with_context(|| format!("extraction service unreachable at {}", config.ollama_url))?;
    if !available {
        bail!("model {} is not available at {}", config.model, config.ollama_url);
    }

    let record = load_record(&args.record_file)
        .with_context(|| format!("failed to load record {}", args.record_file.display()))?;

    let reviewer = ClaimReviewer::new(Box::new(client), config);
    let review = reviewer
        .review_record(&record)
        .with_context(|| format!("claim review failed for {}", args.record_file.display()))?;

    tracing::info!(reason = %review.outcome.reason, "decision rationale");
    tracing::info!("claim report\n{}", review.report);
    review
        .report
        .write_csv(&args.output_file)
        .with_context(|| format!("failed to write report {}", args.output_file.display()))?;

    tracing::info!(
        review_id = %review.review_id,
        decision = %review.outcome.decision,
        confidence = review.outcome.confidence.value(),
        "review complete"
    );
    Ok(())
}
