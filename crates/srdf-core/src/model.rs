//! Semantic robot model types
//!
//! Everything here is plain data produced by the loader in `builder`. Entities
//! refer to each other and to the kinematic tree by name only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Motion allowed by a virtual joint between the robot and an external frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VirtualJointType {
    Planar,
    Floating,
    #[default]
    Fixed,
}

impl VirtualJointType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VirtualJointType::Planar => "planar",
            VirtualJointType::Floating => "floating",
            VirtualJointType::Fixed => "fixed",
        }
    }
}

impl std::fmt::Display for VirtualJointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unrecognized virtual joint type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownJointType(pub String);

impl std::fmt::Display for UnknownJointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown virtual joint type '{}'", self.0)
    }
}

impl std::error::Error for UnknownJointType {}

impl FromStr for VirtualJointType {
    type Err = UnknownJointType;

    /// Case-insensitive, ignores surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planar" => Ok(VirtualJointType::Planar),
            "floating" => Ok(VirtualJointType::Floating),
            "fixed" => Ok(VirtualJointType::Fixed),
            _ => Err(UnknownJointType(s.to_string())),
        }
    }
}

/// Attachment of a robot link to a frame outside the kinematic tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualJoint {
    pub name: String,
    /// Link on the robot (checked against the kinematic tree)
    pub child_link: String,
    /// External frame name (not checked)
    pub parent_frame: String,
    #[serde(rename = "type")]
    pub joint_type: VirtualJointType,
}

/// A `(base_link, tip_link)` pair as declared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    pub base_link: String,
    pub tip_link: String,
}

/// Named planning group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub joints: Vec<String>,
    #[serde(default)]
    pub chains: Vec<Chain>,
    /// Names of included groups, in declaration order
    #[serde(default)]
    pub subgroups: Vec<String>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// True when the group declares no links, joints, chains or subgroups
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
            && self.joints.is_empty()
            && self.chains.is_empty()
            && self.subgroups.is_empty()
    }
}

/// Named joint configuration for a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupState {
    pub name: String,
    pub group: String,
    /// Joint name -> values (several for multi-DOF joints)
    #[serde(default)]
    pub joint_values: BTreeMap<String, Vec<f64>>,
}

/// A group designated as an end effector, attached at `parent_link`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndEffector {
    pub name: String,
    pub component_group: String,
    pub parent_link: String,
}

/// Visual sensor mounted on a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualSensor {
    pub name: String,
    pub frame: String,
    /// Field of view (radians)
    pub fov_angle: f64,
    /// Range along the sensor Z axis
    pub min_range: f64,
    pub max_range: f64,
}

/// Pair of links whose mutual collisions are ignored. Order is irrelevant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionPair {
    pub link1: String,
    pub link2: String,
}

impl CollisionPair {
    pub fn matches(&self, a: &str, b: &str) -> bool {
        (self.link1 == a && self.link2 == b) || (self.link1 == b && self.link2 == a)
    }
}

/// Semantic description of a robot, as accepted by the loader
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    #[serde(default)]
    pub virtual_joints: Vec<VirtualJoint>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub group_states: Vec<GroupState>,
    #[serde(default)]
    pub end_effectors: Vec<EndEffector>,
    #[serde(default)]
    pub visual_sensors: Vec<VisualSensor>,
    #[serde(default)]
    pub disabled_collisions: Vec<CollisionPair>,
}

impl Model {
    /// Drop all content
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.virtual_joints.is_empty()
            && self.groups.is_empty()
            && self.group_states.is_empty()
            && self.end_effectors.is_empty()
            && self.visual_sensors.is_empty()
            && self.disabled_collisions.is_empty()
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn virtual_joint(&self, name: &str) -> Option<&VirtualJoint> {
        self.virtual_joints.iter().find(|v| v.name == name)
    }

    pub fn end_effector(&self, name: &str) -> Option<&EndEffector> {
        self.end_effectors.iter().find(|e| e.name == name)
    }

    pub fn visual_sensor(&self, name: &str) -> Option<&VisualSensor> {
        self.visual_sensors.iter().find(|s| s.name == name)
    }

    /// Group states defined for `group`, in document order
    pub fn group_states_for<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a GroupState> {
        self.group_states.iter().filter(move |s| s.group == group)
    }

    /// End effectors built from `group`, in document order
    pub fn end_effectors_for<'a>(
        &'a self,
        group: &'a str,
    ) -> impl Iterator<Item = &'a EndEffector> {
        self.end_effectors
            .iter()
            .filter(move |e| e.component_group == group)
    }

    /// Whether collisions between `a` and `b` are disabled, in either order
    pub fn is_collision_disabled(&self, a: &str, b: &str) -> bool {
        self.disabled_collisions.iter().any(|p| p.matches(a, b))
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Model {
        let mut arm = Group::new("arm");
        arm.chains.push(Chain {
            base_link: "base".into(),
            tip_link: "tool".into(),
        });
        Model {
            name: "bot".into(),
            groups: vec![arm, Group::new("hand")],
            group_states: vec![
                GroupState {
                    name: "home".into(),
                    group: "arm".into(),
                    joint_values: BTreeMap::from([("j1".to_string(), vec![0.0])]),
                },
                GroupState {
                    name: "open".into(),
                    group: "hand".into(),
                    joint_values: BTreeMap::new(),
                },
            ],
            end_effectors: vec![EndEffector {
                name: "gripper".into(),
                component_group: "hand".into(),
                parent_link: "tool".into(),
            }],
            disabled_collisions: vec![CollisionPair {
                link1: "base".into(),
                link2: "tool".into(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_virtual_joint_type_parsing() {
        assert_eq!(" Planar ".parse(), Ok(VirtualJointType::Planar));
        assert_eq!("FLOATING".parse(), Ok(VirtualJointType::Floating));
        assert_eq!("fixed".parse(), Ok(VirtualJointType::Fixed));
        assert!("ball".parse::<VirtualJointType>().is_err());
        assert_eq!(VirtualJointType::Floating.to_string(), "floating");
    }

    #[test]
    fn test_lookups() {
        let model = sample();
        assert!(model.group("arm").is_some());
        assert!(model.group("ARM").is_none());
        assert!(model.group("hand").unwrap().is_empty());
        assert!(!model.group("arm").unwrap().is_empty());
        assert_eq!(model.end_effector("gripper").unwrap().parent_link, "tool");

        let states: Vec<_> = model.group_states_for("arm").map(|s| &s.name).collect();
        assert_eq!(states, vec!["home"]);
        assert_eq!(model.end_effectors_for("hand").count(), 1);
        assert_eq!(model.end_effectors_for("arm").count(), 0);
    }

    #[test]
    fn test_collision_pairs_are_unordered() {
        let model = sample();
        assert!(model.is_collision_disabled("base", "tool"));
        assert!(model.is_collision_disabled("tool", "base"));
        assert!(!model.is_collision_disabled("base", "base"));
    }

    #[test]
    fn test_clear() {
        let mut model = sample();
        assert!(!model.is_empty());
        model.clear();
        assert!(model.is_empty());
        assert!(model.name.is_empty());
    }

    #[test]
    fn test_json_field_names() {
        let mut model = sample();
        model.virtual_joints.push(VirtualJoint {
            name: "world_joint".into(),
            child_link: "base".into(),
            parent_frame: "odom".into(),
            joint_type: VirtualJointType::Planar,
        });
        let json: serde_json::Value = serde_json::from_str(&model.to_json().unwrap()).unwrap();
        assert_eq!(json["virtual_joints"][0]["type"], "planar");
        assert_eq!(json["groups"][0]["chains"][0]["tip_link"], "tool");

        let back: Model = serde_json::from_value(json).unwrap();
        assert_eq!(back, model);
    }
}
