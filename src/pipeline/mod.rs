pub mod align;
pub mod derive;
pub mod normalize;
pub mod resolve;

use crate::artifacts::{create_artifact, ArtifactReport, ChartArtifact};
use crate::config::Config;
use crate::error::Result;
use crate::types::MetricsApi;
use metrics::{counter, histogram};
use serde::Serialize;
use tracing::{error, info, warn, Instrument};

/// Outcome of a batch of artifact runs. Artifact runs are isolated: one
/// failure never stops the remaining artifacts.
#[derive(Debug, Serialize)]
pub struct BatchResult {
    pub built: Vec<ArtifactReport>,
    pub failures: Vec<ArtifactFailure>,
}

#[derive(Debug, Serialize)]
pub struct ArtifactFailure {
    pub artifact: String,
    pub error: String,
}

impl BatchResult {
    pub fn all_failed(&self) -> bool {
        self.built.is_empty() && !self.failures.is_empty()
    }
}

/// Run the named fetch artifacts against the vendor API, one at a time.
pub async fn run_artifacts(
    api: &dyn MetricsApi,
    config: &Config,
    artifact_names: &[String],
) -> BatchResult {
    let mut built = Vec::new();
    let mut failures = Vec::new();

    for name in artifact_names {
        // the span is attached to the future, never entered across an await
        let span = tracing::info_span!("artifact", artifact = %name);

        let artifact = match create_artifact(name) {
            Some(artifact) => artifact,
            None => {
                span.in_scope(|| warn!("Unknown artifact requested"));
                failures.push(ArtifactFailure {
                    artifact: name.clone(),
                    error: format!("unknown artifact '{name}'"),
                });
                continue;
            }
        };

        let started = std::time::Instant::now();
        let result = run_one(artifact.as_ref(), api, config)
            .instrument(span.clone())
            .await;
        match result {
            Ok(report) => {
                counter!("charts_artifacts_built_total").increment(1);
                histogram!("charts_artifact_duration_seconds")
                    .record(started.elapsed().as_secs_f64());
                span.in_scope(|| {
                    info!(rows = report.rows, file = %report.output_file, "Artifact built")
                });
                built.push(report);
            }
            Err(e) => {
                counter!("charts_artifacts_failed_total").increment(1);
                span.in_scope(|| error!("Artifact failed: {}", e));
                failures.push(ArtifactFailure {
                    artifact: name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    BatchResult { built, failures }
}

async fn run_one(
    artifact: &dyn ChartArtifact,
    api: &dyn MetricsApi,
    config: &Config,
) -> Result<ArtifactReport> {
    let doc = artifact.build(api, config).await?;
    let output_file = crate::output::write_artifact(&doc, config, artifact.output_file())?;
    Ok(ArtifactReport {
        artifact: artifact.artifact_name().to_string(),
        rows: doc.len(),
        output_file,
    })
}
