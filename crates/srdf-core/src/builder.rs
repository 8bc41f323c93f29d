//! Semantic model loading
//!
//! Sections are read in a fixed order so that every reference points at
//! something already accepted: virtual joints, groups, group states, end
//! effectors, visual sensors, disabled collisions. Subgroup references are the
//! exception; they are closed over the whole group set once all groups are
//! read.
//!
//! An entry that is missing a required attribute or names something unknown is
//! dropped with a diagnostic. Only a document without a `<robot>` root fails
//! the load.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::chain::forms_chain;
use crate::closure::SubgroupClosure;
use crate::diagnostics::{Diagnostic, Diagnostics, Issue, Severity};
use crate::kinematics::KinematicTree;
use crate::model::{
    Chain, CollisionPair, EndEffector, Group, GroupState, Model, VirtualJoint, VirtualJointType,
    VisualSensor,
};
use crate::values::{parse_scalar, parse_values};
use crate::xml::{Element, XmlError};

const DOCUMENT: &str = "robot description";

#[derive(Error, Debug)]
pub enum SrdfError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error("Could not find the 'robot' element (found <{0}>)")]
    MissingRobotElement(String),
}

/// A loaded model together with everything reported while loading it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub model: Model,
    pub diagnostics: Vec<Diagnostic>,
}

impl LoadReport {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// True when nothing at all was reported
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Build a model from an already-parsed document root
pub fn build<T: KinematicTree + ?Sized>(
    tree: &T,
    robot: &Element,
) -> Result<LoadReport, SrdfError> {
    if robot.name != "robot" {
        return Err(SrdfError::MissingRobotElement(robot.name.clone()));
    }

    let mut builder = ModelBuilder {
        tree,
        model: Model::default(),
        diagnostics: Diagnostics::new(),
    };
    builder.load_robot_name(robot);
    builder.load_virtual_joints(robot);

    let known_joints = KnownJoints {
        tree,
        virtual_joints: builder
            .model
            .virtual_joints
            .iter()
            .map(|v| v.name.clone())
            .collect(),
    };
    builder.load_groups(robot, &known_joints);
    builder.load_group_states(robot, &known_joints);
    builder.load_end_effectors(robot);
    builder.load_visual_sensors(robot);
    builder.load_disabled_collisions(robot);

    let report = builder.finish();
    info!(
        robot = %report.model.name,
        groups = report.model.groups.len(),
        group_states = report.model.group_states.len(),
        end_effectors = report.model.end_effectors.len(),
        diagnostics = report.diagnostics.len(),
        "Loaded semantic description"
    );
    Ok(report)
}

/// Parse `xml` and build a model from it
pub fn build_from_str<T: KinematicTree + ?Sized>(
    tree: &T,
    xml: &str,
) -> Result<LoadReport, SrdfError> {
    let root = Element::parse(xml)?;
    build(tree, &root)
}

/// Read and build a model from a file
pub fn build_from_file<T: KinematicTree + ?Sized>(
    tree: &T,
    path: impl AsRef<Path>,
) -> Result<LoadReport, SrdfError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| SrdfError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!(path = %path.display(), "Read semantic description");
    build_from_str(tree, &content)
}

/// Joints a group or group state may name: the tree's own joints plus the
/// declared virtual joints
struct KnownJoints<'t, T: ?Sized> {
    tree: &'t T,
    virtual_joints: HashSet<String>,
}

impl<T: KinematicTree + ?Sized> KnownJoints<'_, T> {
    fn contains(&self, name: &str) -> bool {
        self.tree.has_joint(name) || self.virtual_joints.contains(name)
    }
}

struct ModelBuilder<'t, T: ?Sized> {
    tree: &'t T,
    model: Model,
    diagnostics: Diagnostics,
}

impl<T: KinematicTree + ?Sized> ModelBuilder<'_, T> {
    fn finish(self) -> LoadReport {
        LoadReport {
            model: self.model,
            diagnostics: self.diagnostics.into_vec(),
        }
    }

    /// Trimmed attribute value, reporting it when absent
    fn require(
        &mut self,
        element: &Element,
        attribute: &str,
        context: &str,
    ) -> Option<String> {
        match element.attr(attribute) {
            Some(value) => Some(value.trim().to_string()),
            None => {
                self.diagnostics.report(Issue::MissingAttribute {
                    element: element.name.clone(),
                    attribute: attribute.to_string(),
                    context: context.to_string(),
                });
                None
            }
        }
    }

    /// Check a link exists, reporting it when it does not
    fn known_link(&mut self, link: &str, context: &str) -> bool {
        if self.tree.has_link(link) {
            return true;
        }
        self.diagnostics.report(Issue::UnknownLink {
            link: link.to_string(),
            context: context.to_string(),
        });
        false
    }

    /// Check a group has already been accepted, reporting it when not
    fn known_group(&mut self, group: &str, context: &str) -> bool {
        if self.model.group(group).is_some() {
            return true;
        }
        self.diagnostics.report(Issue::UnknownGroup {
            group: group.to_string(),
            context: context.to_string(),
        });
        false
    }

    fn load_robot_name(&mut self, robot: &Element) {
        let Some(name) = robot.attr("name") else {
            self.diagnostics.report(Issue::MissingRobotName);
            return;
        };
        self.model.name = name.trim().to_string();
        if self.model.name != self.tree.robot_name() {
            self.diagnostics.report(Issue::RobotNameMismatch {
                declared: self.model.name.clone(),
                tree: self.tree.robot_name().to_string(),
            });
        }
    }

    fn load_virtual_joints(&mut self, robot: &Element) {
        for vj_xml in robot.children_named("virtual_joint") {
            if let Some(vj) = self.load_virtual_joint(vj_xml) {
                self.model.virtual_joints.push(vj);
            }
        }
    }

    fn load_virtual_joint(&mut self, vj_xml: &Element) -> Option<VirtualJoint> {
        let name = self.require(vj_xml, "name", DOCUMENT)?;
        let context = format!("virtual joint '{name}'");
        let child_link = self.require(vj_xml, "child_link", &context)?;
        if !self.known_link(&child_link, &context) {
            return None;
        }
        let parent_frame = self.require(vj_xml, "parent_frame", &context)?;
        let raw_type = self.require(vj_xml, "type", &context)?;

        let joint_type = raw_type.parse().unwrap_or_else(|_| {
            self.diagnostics.report(Issue::UnknownVirtualJointType {
                joint: name.clone(),
                value: raw_type.clone(),
            });
            VirtualJointType::Fixed
        });

        Some(VirtualJoint {
            name,
            child_link,
            parent_frame,
            joint_type,
        })
    }

    /// Read every group, then keep only those whose subgroups close
    fn load_groups(&mut self, robot: &Element, joints: &KnownJoints<'_, T>) {
        let candidates: Vec<Group> = robot
            .children_named("group")
            .filter_map(|group_xml| self.load_group(group_xml, joints))
            .collect();

        let resolved: HashSet<String> = {
            let closure = SubgroupClosure::resolve(
                candidates
                    .iter()
                    .map(|g| (g.name.as_str(), g.subgroups.as_slice())),
            );
            debug!(
                declared = candidates.len(),
                resolved = closure.len(),
                "Closed subgroup references"
            );
            closure.order().iter().map(|n| n.to_string()).collect()
        };

        for group in candidates {
            if resolved.contains(&group.name) {
                self.model.groups.push(group);
            } else {
                self.diagnostics
                    .report(Issue::UnsatisfiedSubgroups { group: group.name });
            }
        }
    }

    fn load_group(&mut self, group_xml: &Element, joints: &KnownJoints<'_, T>) -> Option<Group> {
        let name = self.require(group_xml, "name", DOCUMENT)?;
        let context = format!("group '{name}'");
        let mut group = Group::new(name.clone());

        for link_xml in group_xml.children_named("link") {
            let Some(link) = self.require(link_xml, "name", &context) else {
                continue;
            };
            if self.known_link(&link, &context) {
                group.links.push(link);
            }
        }

        for joint_xml in group_xml.children_named("joint") {
            let Some(joint) = self.require(joint_xml, "name", &context) else {
                continue;
            };
            if joints.contains(&joint) {
                group.joints.push(joint);
            } else {
                self.diagnostics.report(Issue::UnknownJoint {
                    joint,
                    context: context.clone(),
                });
            }
        }

        for chain_xml in group_xml.children_named("chain") {
            if let Some(chain) = self.load_chain(chain_xml, &name, &context) {
                group.chains.push(chain);
            }
        }

        for subgroup_xml in group_xml.children_named("group") {
            if let Some(subgroup) = self.require(subgroup_xml, "name", &context) {
                group.subgroups.push(subgroup);
            }
        }

        if group.is_empty() {
            self.diagnostics.report(Issue::EmptyGroup { group: name });
        }
        Some(group)
    }

    fn load_chain(&mut self, chain_xml: &Element, group: &str, context: &str) -> Option<Chain> {
        let base_link = self.require(chain_xml, "base_link", context)?;
        let tip_link = self.require(chain_xml, "tip_link", context)?;
        if !self.known_link(&base_link, context) || !self.known_link(&tip_link, context) {
            return None;
        }
        if !forms_chain(self.tree, &base_link, &tip_link) {
            self.diagnostics.report(Issue::BrokenChain {
                base: base_link,
                tip: tip_link,
                group: group.to_string(),
            });
            return None;
        }
        Some(Chain {
            base_link,
            tip_link,
        })
    }

    fn load_group_states(&mut self, robot: &Element, joints: &KnownJoints<'_, T>) {
        for state_xml in robot.children_named("group_state") {
            if let Some(state) = self.load_group_state(state_xml, joints) {
                self.model.group_states.push(state);
            }
        }
    }

    fn load_group_state(
        &mut self,
        state_xml: &Element,
        joints: &KnownJoints<'_, T>,
    ) -> Option<GroupState> {
        let name = self.require(state_xml, "name", DOCUMENT)?;
        let context = format!("group state '{name}'");
        let group = self.require(state_xml, "group", &context)?;
        if !self.known_group(&group, &context) {
            return None;
        }

        let mut state = GroupState {
            name,
            group,
            joint_values: Default::default(),
        };

        for joint_xml in state_xml.children_named("joint") {
            let Some(joint) = self.require(joint_xml, "name", &context) else {
                continue;
            };
            let Some(value) = self.require(joint_xml, "value", &context) else {
                continue;
            };
            if !joints.contains(&joint) {
                self.diagnostics.report(Issue::UnknownJoint {
                    joint,
                    context: context.clone(),
                });
                continue;
            }

            let values = parse_values(
                &value,
                &format!("joint '{joint}' of {context}"),
                &mut self.diagnostics,
            );
            if values.is_empty() {
                self.diagnostics.report(Issue::NoJointValues {
                    joint,
                    value,
                    state: state.name.clone(),
                });
                continue;
            }
            state.joint_values.entry(joint).or_default().extend(values);
        }

        Some(state)
    }

    fn load_end_effectors(&mut self, robot: &Element) {
        for eef_xml in robot.children_named("end_effector") {
            if let Some(eef) = self.load_end_effector(eef_xml) {
                self.model.end_effectors.push(eef);
            }
        }
    }

    fn load_end_effector(&mut self, eef_xml: &Element) -> Option<EndEffector> {
        let name = self.require(eef_xml, "name", DOCUMENT)?;
        let context = format!("end effector '{name}'");
        let component_group = self.require(eef_xml, "group", &context)?;
        if !self.known_group(&component_group, &context) {
            return None;
        }
        let parent_link = self.require(eef_xml, "parent_link", &context)?;
        if !self.known_link(&parent_link, &context) {
            return None;
        }
        Some(EndEffector {
            name,
            component_group,
            parent_link,
        })
    }

    fn load_visual_sensors(&mut self, robot: &Element) {
        for sensor_xml in robot.children_named("visual_sensor") {
            if let Some(sensor) = self.load_visual_sensor(sensor_xml) {
                self.model.visual_sensors.push(sensor);
            }
        }
    }

    fn load_visual_sensor(&mut self, sensor_xml: &Element) -> Option<VisualSensor> {
        let name = self.require(sensor_xml, "name", DOCUMENT)?;
        let context = format!("visual sensor '{name}'");
        let frame = self.require(sensor_xml, "frame", &context)?;
        let fov_angle = self.require(sensor_xml, "fov_angle", &context)?;
        let min_range = self.require(sensor_xml, "min_range", &context)?;
        let max_range = self.require(sensor_xml, "max_range", &context)?;

        let fov_angle = self.sensor_number(&name, "field of view angle", &fov_angle)?;
        let min_range = self.sensor_number(&name, "minimum range", &min_range)?;
        let max_range = self.sensor_number(&name, "maximum range", &max_range)?;

        Some(VisualSensor {
            name,
            frame,
            fov_angle,
            min_range,
            max_range,
        })
    }

    fn sensor_number(&mut self, sensor: &str, field: &str, value: &str) -> Option<f64> {
        let parsed = parse_scalar(value);
        if parsed.is_none() {
            self.diagnostics.report(Issue::InvalidSensorValue {
                sensor: sensor.to_string(),
                field: field.to_string(),
                value: value.to_string(),
            });
        }
        parsed
    }

    fn load_disabled_collisions(&mut self, robot: &Element) {
        for pair_xml in robot.children_named("disable_collisions") {
            if let Some(pair) = self.load_collision_pair(pair_xml) {
                self.model.disabled_collisions.push(pair);
            }
        }
    }

    fn load_collision_pair(&mut self, pair_xml: &Element) -> Option<CollisionPair> {
        const CONTEXT: &str = "disabled collision pair";
        let link1 = self.require(pair_xml, "link1", CONTEXT)?;
        let link2 = self.require(pair_xml, "link2", CONTEXT)?;
        if !self.known_link(&link1, CONTEXT) || !self.known_link(&link2, CONTEXT) {
            return None;
        }
        Some(CollisionPair { link1, link2 })
    }
}
