//! Per-entry load diagnostics
//!
//! Nothing short of a missing `<robot>` element stops a load. Every rejected,
//! defaulted or suspicious entry is instead recorded as a [`Diagnostic`] and
//! mirrored to `tracing`, and loading carries on with the next entry.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// What went wrong with a single entry
///
/// `context` fields name the enclosing entry, e.g. `group 'arm'`.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Issue {
    #[error("No name given for the robot")]
    MissingRobotName,
    #[error("Semantic description is for robot '{declared}' but the kinematic tree is '{tree}'")]
    RobotNameMismatch { declared: String, tree: String },
    #[error("<{element}> in {context} is missing attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: String,
        context: String,
    },
    #[error("Link '{link}' referenced by {context} is not known to the kinematic tree")]
    UnknownLink { link: String, context: String },
    #[error("Joint '{joint}' referenced by {context} is not known to the kinematic tree")]
    UnknownJoint { joint: String, context: String },
    #[error("Group '{group}' referenced by {context} is not known")]
    UnknownGroup { group: String, context: String },
    #[error(
        "Unknown type '{value}' for virtual joint '{joint}'; assuming 'fixed' (known types are 'planar', 'floating' and 'fixed')"
    )]
    UnknownVirtualJointType { joint: String, value: String },
    #[error("Links '{base}' and '{tip}' do not form a chain; not included in group '{group}'")]
    BrokenChain {
        base: String,
        tip: String,
        group: String,
    },
    #[error("Group '{group}' is empty")]
    EmptyGroup { group: String },
    #[error("Group '{group}' has unsatisfied subgroups")]
    UnsatisfiedSubgroups { group: String },
    #[error("Unable to parse '{token}' as a number in {context}")]
    InvalidNumber { token: String, context: String },
    #[error("No joint values parsed from '{value}' for joint '{joint}' in group state '{state}'")]
    NoJointValues {
        joint: String,
        value: String,
        state: String,
    },
    #[error("Unable to parse {field} ('{value}') for visual sensor '{sensor}'")]
    InvalidSensorValue {
        sensor: String,
        field: String,
        value: String,
    },
}

impl Issue {
    /// Default severity for this kind of issue
    pub fn severity(&self) -> Severity {
        match self {
            Issue::EmptyGroup { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Issue::MissingRobotName => "missing_robot_name",
            Issue::RobotNameMismatch { .. } => "robot_name_mismatch",
            Issue::MissingAttribute { .. } => "missing_attribute",
            Issue::UnknownLink { .. } => "unknown_link",
            Issue::UnknownJoint { .. } => "unknown_joint",
            Issue::UnknownGroup { .. } => "unknown_group",
            Issue::UnknownVirtualJointType { .. } => "unknown_virtual_joint_type",
            Issue::BrokenChain { .. } => "broken_chain",
            Issue::EmptyGroup { .. } => "empty_group",
            Issue::UnsatisfiedSubgroups { .. } => "unsatisfied_subgroups",
            Issue::InvalidNumber { .. } => "invalid_number",
            Issue::NoJointValues { .. } => "no_joint_values",
            Issue::InvalidSensorValue { .. } => "invalid_sensor_value",
        }
    }
}

/// A reported issue with its severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    #[serde(flatten)]
    pub issue: Issue,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.issue)
    }
}

/// Ordered diagnostic sink used while a model is being built
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue at its default severity
    pub fn report(&mut self, issue: Issue) {
        let severity = issue.severity();
        match severity {
            Severity::Error => error!(code = issue.code(), "{}", issue),
            Severity::Warning => warn!(code = issue.code(), "{}", issue),
        }
        self.entries.push(Diagnostic { severity, issue });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
