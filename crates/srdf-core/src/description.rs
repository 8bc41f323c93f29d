//! Reloadable semantic description

use std::path::Path;

use crate::builder::{build, build_from_file, build_from_str, LoadReport, SrdfError};
use crate::diagnostics::Diagnostic;
use crate::kinematics::KinematicTree;
use crate::model::Model;
use crate::xml::Element;

/// Holds the most recently loaded model.
///
/// Every `init_*` call starts from an empty model; nothing from a previous
/// load survives, including when the new load fails.
#[derive(Debug, Clone, Default)]
pub struct SemanticDescription {
    report: LoadReport,
}

impl SemanticDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init_element<T: KinematicTree + ?Sized>(
        &mut self,
        tree: &T,
        robot: &Element,
    ) -> Result<(), SrdfError> {
        self.clear();
        self.report = build(tree, robot)?;
        Ok(())
    }

    pub fn init_string<T: KinematicTree + ?Sized>(
        &mut self,
        tree: &T,
        xml: &str,
    ) -> Result<(), SrdfError> {
        self.clear();
        self.report = build_from_str(tree, xml)?;
        Ok(())
    }

    pub fn init_file<T: KinematicTree + ?Sized>(
        &mut self,
        tree: &T,
        path: impl AsRef<Path>,
    ) -> Result<(), SrdfError> {
        self.clear();
        self.report = build_from_file(tree, path)?;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.report = LoadReport::default();
    }

    pub fn model(&self) -> &Model {
        &self.report.model
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.report.diagnostics
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Take ownership of the loaded model and its diagnostics
    pub fn into_report(self) -> LoadReport {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::UrdfTree;

    const URDF: &str = r#"
        <robot name="pendulum">
            <link name="base"/>
            <link name="bob"/>
            <joint name="swing"><parent link="base"/><child link="bob"/></joint>
        </robot>
    "#;

    const SRDF: &str = r#"
        <robot name="pendulum">
            <group name="pendulum"><joint name="swing"/></group>
            <group name="ghost"><link name="nowhere"/></group>
        </robot>
    "#;

    #[test]
    fn test_reload_replaces_previous_content() {
        let tree = UrdfTree::from_xml(URDF).unwrap();
        let mut description = SemanticDescription::new();

        description.init_string(&tree, SRDF).unwrap();
        assert_eq!(description.model().groups.len(), 2);
        assert_eq!(description.diagnostics().len(), 2);

        description
            .init_string(&tree, r#"<robot name="pendulum"><group name="bob"><link name="bob"/></group></robot>"#)
            .unwrap();
        assert_eq!(description.model().groups.len(), 1);
        assert_eq!(description.model().groups[0].name, "bob");
        assert!(description.diagnostics().is_empty());
    }

    #[test]
    fn test_failed_load_leaves_model_cleared() {
        let tree = UrdfTree::from_xml(URDF).unwrap();
        let mut description = SemanticDescription::new();
        description.init_string(&tree, SRDF).unwrap();
        assert!(!description.model().is_empty());

        let result = description.init_element(&tree, &Element::new("hcdf"));
        assert!(matches!(result, Err(SrdfError::MissingRobotElement(_))));
        assert!(description.model().is_empty());
        assert!(description.model().name.is_empty());
        assert!(description.diagnostics().is_empty());
    }

    #[test]
    fn test_init_file() {
        let tree = UrdfTree::from_xml(URDF).unwrap();
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), SRDF).unwrap();

        let mut description = SemanticDescription::new();
        description.init_file(&tree, file.path()).unwrap();
        assert_eq!(description.model().name, "pendulum");
        assert_eq!(description.into_report().errors().count(), 1);
    }
}
