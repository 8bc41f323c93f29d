//! Kinematic tree queries and a URDF-backed implementation
//!
//! The semantic loader only ever asks four questions of the robot's
//! kinematic structure, captured by [`KinematicTree`]. [`UrdfTree`] answers
//! them from a URDF document, keeping just the names and the child → parent
//! link relation.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::xml::{Element, XmlError};

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error("Expected <robot> root element, found <{0}>")]
    WrongRoot(String),
    #[error("<{element}> is missing attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    #[error("Duplicate link '{0}'")]
    DuplicateLink(String),
    #[error("Duplicate joint '{0}'")]
    DuplicateJoint(String),
    #[error("Joint '{joint}' references unknown link '{link}'")]
    UnknownLink { joint: String, link: String },
    #[error("Link '{0}' is the child of more than one joint")]
    MultipleParents(String),
    #[error("No root link found (every link has a parent)")]
    NoRootLink,
    #[error("Kinematic loop through link '{0}'")]
    Loop(String),
    #[error("Link '{link}' is not connected to root link '{root}'")]
    Disconnected { link: String, root: String },
}

/// Read-only view of a robot's kinematic tree
pub trait KinematicTree {
    /// Name of the robot the tree describes
    fn robot_name(&self) -> &str;
    fn has_link(&self, name: &str) -> bool;
    fn has_joint(&self, name: &str) -> bool;
    /// Parent link of `name`; `None` at the root or for unknown links
    fn parent_link(&self, name: &str) -> Option<&str>;
}

/// A joint as seen by the tree: its name and the links it connects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeJoint {
    pub name: String,
    pub parent: String,
    pub child: String,
}

/// Kinematic tree loaded from a URDF document
#[derive(Debug, Clone)]
pub struct UrdfTree {
    name: String,
    /// Link names in document order
    links: Vec<String>,
    joints: Vec<TreeJoint>,
    link_index: HashSet<String>,
    joint_index: HashSet<String>,
    /// child link -> parent link
    parents: HashMap<String, String>,
    root_link: String,
}

impl UrdfTree {
    /// Parse URDF from XML string
    pub fn from_xml(xml: &str) -> Result<Self, TreeError> {
        let root = Element::parse(xml)?;
        Self::from_element(&root)
    }

    /// Parse URDF from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TreeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TreeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_xml(&content)
    }

    /// Build the tree from an already-parsed `<robot>` element
    pub fn from_element(robot: &Element) -> Result<Self, TreeError> {
        if robot.name != "robot" {
            return Err(TreeError::WrongRoot(robot.name.clone()));
        }
        let name = robot.attr("name").unwrap_or_default().trim().to_string();

        let mut links = Vec::new();
        let mut link_index = HashSet::new();
        for link in robot.children_named("link") {
            let link_name = required(link, "link", "name")?;
            if !link_index.insert(link_name.clone()) {
                return Err(TreeError::DuplicateLink(link_name));
            }
            links.push(link_name);
        }

        let mut joints = Vec::new();
        let mut joint_index = HashSet::new();
        let mut parents = HashMap::new();
        for joint in robot.children_named("joint") {
            let joint_name = required(joint, "joint", "name")?;
            let parent = joint
                .children_named("parent")
                .next()
                .ok_or(TreeError::MissingAttribute {
                    element: "joint",
                    attribute: "parent",
                })
                .and_then(|p| required(p, "parent", "link"))?;
            let child = joint
                .children_named("child")
                .next()
                .ok_or(TreeError::MissingAttribute {
                    element: "joint",
                    attribute: "child",
                })
                .and_then(|c| required(c, "child", "link"))?;

            for link in [&parent, &child] {
                if !link_index.contains(link) {
                    return Err(TreeError::UnknownLink {
                        joint: joint_name.clone(),
                        link: link.clone(),
                    });
                }
            }
            if !joint_index.insert(joint_name.clone()) {
                return Err(TreeError::DuplicateJoint(joint_name));
            }
            if parents.insert(child.clone(), parent.clone()).is_some() {
                return Err(TreeError::MultipleParents(child));
            }
            joints.push(TreeJoint {
                name: joint_name,
                parent,
                child,
            });
        }

        let root_link = links
            .iter()
            .find(|l| !parents.contains_key(*l))
            .cloned()
            .ok_or(TreeError::NoRootLink)?;

        let tree = Self {
            name,
            links,
            joints,
            link_index,
            joint_index,
            parents,
            root_link,
        };
        tree.check_connected()?;

        debug!(
            robot = %tree.name,
            links = tree.links.len(),
            joints = tree.joints.len(),
            root = %tree.root_link,
            "Loaded kinematic tree"
        );
        Ok(tree)
    }

    /// Every link must reach the root by following parents.
    fn check_connected(&self) -> Result<(), TreeError> {
        for link in &self.links {
            let mut seen = HashSet::new();
            let mut current = link.as_str();
            while let Some(parent) = self.parents.get(current) {
                if !seen.insert(current) {
                    return Err(TreeError::Loop(link.clone()));
                }
                current = parent.as_str();
            }
            if current != self.root_link {
                return Err(TreeError::Disconnected {
                    link: link.clone(),
                    root: self.root_link.clone(),
                });
            }
        }
        Ok(())
    }

    /// The single link that has no parent
    pub fn root_link(&self) -> &str {
        &self.root_link
    }

    /// Link names in document order
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(String::as_str)
    }

    /// Joints in document order
    pub fn joints(&self) -> impl Iterator<Item = &TreeJoint> {
        self.joints.iter()
    }
}

impl KinematicTree for UrdfTree {
    fn robot_name(&self) -> &str {
        &self.name
    }

    fn has_link(&self, name: &str) -> bool {
        self.link_index.contains(name)
    }

    fn has_joint(&self, name: &str) -> bool {
        self.joint_index.contains(name)
    }

    fn parent_link(&self, name: &str) -> Option<&str> {
        self.parents.get(name).map(String::as_str)
    }
}

fn required(
    element: &Element,
    tag: &'static str,
    attribute: &'static str,
) -> Result<String, TreeError> {
    element
        .attr(attribute)
        .map(|v| v.trim().to_string())
        .ok_or(TreeError::MissingAttribute {
            element: tag,
            attribute,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARM_URDF: &str = r#"
        <robot name="arm">
            <link name="base"/>
            <link name="link1"/>
            <link name="link2"/>
            <joint name="joint1" type="revolute">
                <parent link="base"/>
                <child link="link1"/>
            </joint>
            <joint name="joint2" type="continuous">
                <parent link="link1"/>
                <child link="link2"/>
            </joint>
        </robot>
    "#;

    #[test]
    fn test_parse_serial_arm() {
        let tree = UrdfTree::from_xml(ARM_URDF).unwrap();
        assert_eq!(tree.robot_name(), "arm");
        assert_eq!(tree.root_link(), "base");
        assert_eq!(tree.links().count(), 3);
        assert!(tree.has_link("link2"));
        assert!(!tree.has_link("link3"));
        assert!(tree.has_joint("joint1"));
        assert!(!tree.has_joint("base"));
        assert_eq!(tree.parent_link("link2"), Some("link1"));
        assert_eq!(tree.parent_link("base"), None);
        assert_eq!(tree.parent_link("nowhere"), None);

        let joint = tree.joints().next().unwrap();
        assert_eq!(joint.parent, "base");
        assert_eq!(joint.child, "link1");
    }

    #[test]
    fn test_unknown_link_rejected() {
        let xml = r#"
            <robot name="r">
                <link name="a"/>
                <joint name="j"><parent link="a"/><child link="ghost"/></joint>
            </robot>"#;
        let err = UrdfTree::from_xml(xml).unwrap_err();
        assert!(matches!(err, TreeError::UnknownLink { ref link, .. } if link == "ghost"));
    }

    #[test]
    fn test_multiple_parents_rejected() {
        let xml = r#"
            <robot name="r">
                <link name="a"/><link name="b"/><link name="c"/>
                <joint name="j1"><parent link="a"/><child link="c"/></joint>
                <joint name="j2"><parent link="b"/><child link="c"/></joint>
            </robot>"#;
        assert!(matches!(
            UrdfTree::from_xml(xml),
            Err(TreeError::MultipleParents(ref l)) if l == "c"
        ));
    }

    #[test]
    fn test_disconnected_tree_rejected() {
        let xml = r#"
            <robot name="r">
                <link name="a"/><link name="b"/>
            </robot>"#;
        assert!(matches!(
            UrdfTree::from_xml(xml),
            Err(TreeError::Disconnected { ref link, .. }) if link == "b"
        ));
    }

    #[test]
    fn test_loop_rejected() {
        let xml = r#"
            <robot name="r">
                <link name="root"/><link name="a"/><link name="b"/>
                <joint name="j1"><parent link="a"/><child link="b"/></joint>
                <joint name="j2"><parent link="b"/><child link="a"/></joint>
            </robot>"#;
        assert!(matches!(UrdfTree::from_xml(xml), Err(TreeError::Loop(_))));
    }

    #[test]
    fn test_wrong_root_and_missing_file() {
        assert!(matches!(
            UrdfTree::from_xml("<hcdf/>"),
            Err(TreeError::WrongRoot(_))
        ));
        assert!(matches!(
            UrdfTree::from_file("/nonexistent/robot.urdf"),
            Err(TreeError::Io { .. })
        ));
    }
}
