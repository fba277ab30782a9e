//! Job lifecycle state machine and the client-facing job projection.
//!
//! Both the simulator and the proxy share this model: the simulator drives
//! [`Job`] values through their transitions directly, while the proxy only
//! relays what the provider reports.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::types::{JobId, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle state of a generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl JobStatus {
    /// Wire token for this status (matches the serde representation).
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::Canceled => "canceled",
        }
    }

    /// Whether no further transitions are allowed out of this state.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Canceled
        )
    }

    /// Returns the set of states reachable in one step from `self`.
    ///
    /// Terminal states return an empty slice.
    pub fn valid_transitions(self) -> &'static [JobStatus] {
        match self {
            JobStatus::Queued => &[
                JobStatus::Processing,
                JobStatus::Failed,
                JobStatus::Canceled,
            ],
            JobStatus::Processing => &[
                JobStatus::Succeeded,
                JobStatus::Failed,
                JobStatus::Canceled,
            ],
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Canceled => &[],
        }
    }

    /// Check whether a transition from `self` to `to` is valid.
    pub fn can_transition_to(self, to: JobStatus) -> bool {
        self.valid_transitions().contains(&to)
    }

    /// Validate a transition, returning an error message for invalid ones.
    pub fn validate_transition(self, to: JobStatus) -> Result<(), String> {
        if self.can_transition_to(to) {
            Ok(())
        } else {
            Err(format!("Invalid transition: {self} -> {to}"))
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Generation parameters supplied by the caller.
///
/// `aspect_ratio` and `width`/`height` are alternative sizing inputs; both may
/// be present and neither is checked against the other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Text prompt. A missing field deserializes to an empty string so that
    /// [`GenerationOptions::validate`] reports it uniformly.
    #[serde(default)]
    pub prompt: String,
    /// Clip length in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Aspect ratio token, e.g. `16:9`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    /// Frame width in pixels.
    #[serde(
        default,
        deserialize_with = "deserialize_pixels",
        skip_serializing_if = "Option::is_none"
    )]
    pub width: Option<u32>,
    /// Frame height in pixels.
    #[serde(
        default,
        deserialize_with = "deserialize_pixels",
        skip_serializing_if = "Option::is_none"
    )]
    pub height: Option<u32>,
}

/// Accept any JSON number that is a whole, non-negative pixel count, so
/// clients sending `1280.0` are treated like `1280`.
fn deserialize_pixels<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if value.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&value) {
        return Err(serde::de::Error::custom(format!(
            "pixel size must be a whole non-negative number, got {value}"
        )));
    }
    Ok(Some(value as u32))
}

impl GenerationOptions {
    /// Build options carrying only a prompt.
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Validate the caller-supplied options.
    ///
    /// The prompt must contain at least one non-whitespace character.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.prompt.trim().is_empty() {
            return Err(CoreError::Validation(
                "prompt is required and must be non-empty text".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// Output of a successful generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub video_url: String,
}

/// Externally visible projection of a generation job.
///
/// `result` is set only in [`JobStatus::Succeeded`] and `error` only in
/// [`JobStatus::Failed`]; the transition methods below are the only way to
/// change either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub options: GenerationOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    /// A freshly submitted job in `queued` state.
    pub fn new(id: JobId, options: GenerationOptions, now: Timestamp) -> Self {
        Self {
            id,
            status: JobStatus::Queued,
            created_at: now,
            updated_at: now,
            options,
            result: None,
            error: None,
        }
    }

    /// `queued -> processing`. Returns `false` if the transition is not allowed.
    pub fn start_processing(&mut self, now: Timestamp) -> bool {
        self.advance(JobStatus::Processing, now)
    }

    /// `processing -> succeeded`, attaching the produced asset.
    pub fn succeed(&mut self, video_url: String, now: Timestamp) -> bool {
        if !self.advance(JobStatus::Succeeded, now) {
            return false;
        }
        self.result = Some(JobResult { video_url });
        true
    }

    /// `queued | processing -> failed`, attaching a diagnostic.
    pub fn fail(&mut self, error: impl Into<String>, now: Timestamp) -> bool {
        if !self.advance(JobStatus::Failed, now) {
            return false;
        }
        self.error = Some(error.into());
        true
    }

    /// `queued | processing -> canceled`.
    ///
    /// Returns `false` and leaves the job untouched when it is already
    /// terminal.
    pub fn cancel(&mut self, now: Timestamp) -> bool {
        self.advance(JobStatus::Canceled, now)
    }

    fn advance(&mut self, to: JobStatus, now: Timestamp) -> bool {
        if let Err(reason) = self.status.validate_transition(to) {
            tracing::debug!(job_id = %self.id, %reason, "Ignoring job transition");
            return false;
        }
        self.status = to;
        // Clamp so updated_at never moves backwards, even with a skewed clock.
        self.updated_at = now.max(self.updated_at);
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
