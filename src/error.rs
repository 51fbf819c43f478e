// Error taxonomy for decay models and the generator that drives them

use thiserror::Error;

/// Every failure a decay model or the batch generator can report.
///
/// The three categories a channel plugin itself produces are
/// [`DecayError::Config`] (bad channel definition, fatal to setup),
/// [`DecayError::Numerical`] (no usable density bound, fatal to setup) and
/// [`DecayError::SamplingTimeout`] (one event could not be generated). The
/// remaining variants cover misuse of the lifecycle and the collaborators
/// around the kernel.
#[derive(Debug, Error)]
pub enum DecayError {
    /// Malformed or physically inconsistent channel definition.
    #[error("configuration error in {model}: {reason}")]
    Config { model: String, reason: String },

    /// The density bound search produced no finite positive maximum.
    #[error("numerical error in {model}: {reason}")]
    Numerical { model: String, reason: String },

    /// The accept/reject loop exhausted its iteration budget.
    #[error("sampling timeout in {model}: no configuration accepted after {attempts} attempts")]
    SamplingTimeout { model: String, attempts: usize },

    /// An operation was called out of order (e.g. sample before establish_bound).
    #[error("lifecycle error in {model}: {reason}")]
    Lifecycle { model: String, reason: String },

    /// Per-event kinematics cannot be satisfied, e.g. the parent is below threshold.
    #[error("kinematics error: {0}")]
    Kinematics(String),

    #[error("unknown decay model '{0}'")]
    UnknownModel(String),

    #[error("unknown particle '{0}'")]
    UnknownParticle(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DecayError {
    pub fn config(model: impl Into<String>, reason: impl Into<String>) -> Self {
        DecayError::Config {
            model: model.into(),
            reason: reason.into(),
        }
    }

    pub fn numerical(model: impl Into<String>, reason: impl Into<String>) -> Self {
        DecayError::Numerical {
            model: model.into(),
            reason: reason.into(),
        }
    }

    pub fn lifecycle(model: impl Into<String>, reason: impl Into<String>) -> Self {
        DecayError::Lifecycle {
            model: model.into(),
            reason: reason.into(),
        }
    }

    /// True for failures that leave the model unusable (setup failures).
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            DecayError::Config { .. }
                | DecayError::Numerical { .. }
                | DecayError::UnknownModel(_)
                | DecayError::UnknownParticle(_)
        )
    }
}

pub type DecayResult<T> = Result<T, DecayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_model() {
        let err = DecayError::config("VSS", "expected 2 daughters, got 3");
        assert_eq!(
            err.to_string(),
            "configuration error in VSS: expected 2 daughters, got 3"
        );

        let err = DecayError::SamplingTimeout {
            model: "PHSP".to_string(),
            attempts: 10,
        };
        assert!(err.to_string().contains("after 10 attempts"));
    }

    #[test]
    fn test_setup_failure_classification() {
        assert!(DecayError::config("X", "bad").is_setup_failure());
        assert!(DecayError::numerical("X", "nan").is_setup_failure());
        assert!(!DecayError::SamplingTimeout {
            model: "X".to_string(),
            attempts: 1
        }
        .is_setup_failure());
        assert!(!DecayError::Kinematics("below threshold".to_string()).is_setup_failure());
    }
}
