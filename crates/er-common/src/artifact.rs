use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::FEATURE_NAMES;
use crate::ranker::{
    load_config_from_env, PairwiseLogisticRanker, RankerError, RelevanceRanker, UniformRanker,
};

pub const ARTIFACT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read/write model artifact at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("model artifact is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported artifact schema version {found} (expected {ARTIFACT_SCHEMA_VERSION})")]
    SchemaVersion { found: u32 },
    #[error(
        "artifact feature list does not match the current feature builder \
         (bound: {bound:?}, current: {current:?})"
    )]
    FeatureOrderMismatch {
        bound: Vec<String>,
        current: Vec<String>,
    },
    #[error("unknown ranking algorithm in artifact: {0}")]
    UnknownAlgorithm(String),
    #[error("artifact parameters rejected by the ranker: {0}")]
    Model(#[from] RankerError),
}

/// Versioned, self-describing model blob. `feature_names` pins the exact
/// vector order the model was trained on; a serving process whose feature
/// builder disagrees must refuse to load it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub schema_version: u32,
    pub algorithm: String,
    pub algorithm_version: String,
    pub model_version: String,
    pub trained_at: DateTime<Utc>,
    pub feature_names: Vec<String>,
    pub params: serde_json::Value,
}

impl ModelArtifact {
    pub fn from_ranker(ranker: &dyn RelevanceRanker, model_version: &str) -> Self {
        Self {
            schema_version: ARTIFACT_SCHEMA_VERSION,
            algorithm: ranker.name().to_string(),
            algorithm_version: ranker.version().to_string(),
            model_version: model_version.to_string(),
            trained_at: Utc::now(),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            params: ranker.params(),
        }
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.schema_version != ARTIFACT_SCHEMA_VERSION {
            return Err(ArtifactError::SchemaVersion {
                found: self.schema_version,
            });
        }

        let current: Vec<String> = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
        if self.feature_names != current {
            return Err(ArtifactError::FeatureOrderMismatch {
                bound: self.feature_names.clone(),
                current,
            });
        }

        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ArtifactError {
    ArtifactError::Io {
        path: path.display().to_string(),
        source,
    }
}

pub fn save_artifact<P: AsRef<Path>>(
    path: P,
    artifact: &ModelArtifact,
) -> Result<(), ArtifactError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| io_error(path, err))?;
        }
    }

    let body = serde_json::to_vec_pretty(artifact)?;
    fs::write(path, body).map_err(|err| io_error(path, err))?;

    tracing::info!(
        path = %path.display(),
        algorithm = artifact.algorithm,
        model_version = artifact.model_version,
        "saved model artifact"
    );
    Ok(())
}

/// Load and validate the raw artifact. Fails loudly on a schema or feature
/// order mismatch: serving must not start on a stale or foreign model.
pub fn load_artifact<P: AsRef<Path>>(path: P) -> Result<ModelArtifact, ArtifactError> {
    let path = path.as_ref();
    let body = fs::read(path).map_err(|err| io_error(path, err))?;
    let artifact: ModelArtifact = serde_json::from_slice(&body)?;
    artifact.validate()?;
    Ok(artifact)
}

/// Load an artifact and reconstruct its concrete ranker. Unlike the
/// training-side factory this dispatch is strict: an unknown algorithm is
/// an error, never a silent fallback.
pub fn load_ranker<P: AsRef<Path>>(
    path: P,
) -> Result<(ModelArtifact, Box<dyn RelevanceRanker>), ArtifactError> {
    let artifact = load_artifact(path)?;

    let ranker: Box<dyn RelevanceRanker> = match artifact.algorithm.as_str() {
        "pairwise_logistic" => Box::new(PairwiseLogisticRanker::from_params(
            load_config_from_env(),
            &artifact.params,
        )?),
        "uniform" => Box::new(UniformRanker::from_params(&artifact.params)?),
        other => return Err(ArtifactError::UnknownAlgorithm(other.to_string())),
    };

    tracing::info!(
        algorithm = artifact.algorithm,
        model_version = artifact.model_version,
        trained_at = %artifact.trained_at,
        "loaded model artifact"
    );
    Ok((artifact, ranker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranker::RankerConfig;

    fn fitted_ranker() -> PairwiseLogisticRanker {
        let mut ranker = PairwiseLogisticRanker::new(RankerConfig::default());
        ranker
            .fit(&[[1.0; 6], [0.0; 6]], &[1, 0], &[2])
            .expect("fit");
        ranker
    }

    #[test]
    fn save_load_round_trip_restores_scoring() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("models").join("ranker.json");
        let ranker = fitted_ranker();

        save_artifact(&path, &ModelArtifact::from_ranker(&ranker, "01TESTRUN")).expect("save");
        let (artifact, restored) = load_ranker(&path).expect("load");

        assert_eq!(artifact.model_version, "01TESTRUN");
        assert_eq!(artifact.feature_names.len(), FEATURE_NAMES.len());
        let batch = [[1.0; 6], [0.5; 6], [0.0; 6]];
        assert_eq!(restored.score(&batch), ranker.score(&batch));
    }

    #[test]
    fn feature_order_mismatch_fails_loudly() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ranker.json");
        let mut artifact = ModelArtifact::from_ranker(&fitted_ranker(), "01TESTRUN");
        artifact.feature_names.swap(0, 1);
        save_artifact(&path, &artifact).expect("save");

        let err = load_ranker(&path).err().unwrap();
        assert!(matches!(err, ArtifactError::FeatureOrderMismatch { .. }));
    }

    #[test]
    fn unknown_algorithm_fails_loudly() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ranker.json");
        let mut artifact = ModelArtifact::from_ranker(&fitted_ranker(), "01TESTRUN");
        artifact.algorithm = "gradient_trees".into();
        save_artifact(&path, &artifact).expect("save");

        let err = load_ranker(&path).err().unwrap();
        assert!(matches!(err, ArtifactError::UnknownAlgorithm(name) if name == "gradient_trees"));
    }

    #[test]
    fn future_schema_version_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ranker.json");
        let mut artifact = ModelArtifact::from_ranker(&fitted_ranker(), "01TESTRUN");
        artifact.schema_version = ARTIFACT_SCHEMA_VERSION + 1;
        save_artifact(&path, &artifact).expect("save");

        let err = load_artifact(&path).unwrap_err();
        assert!(matches!(err, ArtifactError::SchemaVersion { .. }));
    }

    #[test]
    fn missing_artifact_is_an_io_error() {
        let err = load_ranker("/nonexistent/ranker.json").err().unwrap();
        assert!(matches!(err, ArtifactError::Io { .. }));
    }
}
