//! SRDF Core - semantic robot description loading
//!
//! This crate layers a semantic description on top of a robot's kinematic
//! tree:
//! - Planning groups built from links, joints, chains and other groups
//! - Virtual joints attaching the robot to external frames
//! - Named group states, end effectors and visual sensors
//! - Disabled collision pairs
//!
//! Every reference is checked against the kinematic tree and against the
//! description itself. Invalid entries are dropped and reported as
//! diagnostics rather than failing the whole load.

pub mod builder;
pub mod chain;
pub mod closure;
pub mod description;
pub mod diagnostics;
pub mod kinematics;
pub mod model;
pub mod values;
pub mod xml;

pub use builder::{build, build_from_file, build_from_str, LoadReport, SrdfError};
pub use description::SemanticDescription;
pub use diagnostics::{Diagnostic, Issue, Severity};
pub use kinematics::{KinematicTree, TreeError, UrdfTree};
pub use model::{
    Chain, CollisionPair, EndEffector, Group, GroupState, Model, VirtualJoint, VirtualJointType,
    VisualSensor,
};
pub use xml::{Element, XmlError};
