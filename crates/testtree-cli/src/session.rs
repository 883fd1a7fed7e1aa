//! A discovery session: the scanner and presentation-layer roles around one
//! [`ElementFactory`].
//!
//! The session walks a manifest top down, feeds every entity to the factory,
//! and does what a tree view does with the results: stores them and marks
//! them valid again.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::bail;
use parking_lot::Mutex;
use tracing::info;

use testtree_registry::{ElementFactory, FactoryConfig, SuiteDiscovery};
use testtree_store::{ElementRef, ElementStore, InMemoryElementStore};
use testtree_types::{ElementId, ElementState, ProjectId, TargetFrameworkId};

use crate::manifest::{CaseManifest, Manifest};

/// What one pass produced.
#[derive(Debug, Default)]
pub struct PassReport {
    /// Every element returned by the factory, by id.
    pub elements: BTreeMap<ElementId, ElementRef>,
    /// Suites whose categories changed during the pass.
    pub categories_changed: Vec<ElementId>,
}

pub struct Session {
    store: Arc<InMemoryElementStore>,
    factory: ElementFactory,
    changed: Arc<Mutex<Vec<ElementId>>>,
}

impl Session {
    pub fn new(target: &str, config: FactoryConfig) -> anyhow::Result<Self> {
        let store = Arc::new(InMemoryElementStore::new());
        let changed = Arc::new(Mutex::new(Vec::new()));
        let sink = changed.clone();
        let observer = move |element: &ElementRef| sink.lock().push(element.id().clone());
        let factory = ElementFactory::new(store.clone(), TargetFrameworkId::new(target)?, config)
            .with_observer(Arc::new(observer));
        Ok(Self {
            store,
            factory,
            changed,
        })
    }

    pub fn store(&self) -> &InMemoryElementStore {
        &self.store
    }

    /// Run one discovery pass over `manifest`.
    pub fn run_pass(&self, manifest: &Manifest) -> anyhow::Result<PassReport> {
        if manifest.target != self.factory.target().as_str() {
            bail!(
                "manifest targets {} but the session was started for {}",
                manifest.target,
                self.factory.target()
            );
        }
        let project = ProjectId::new(manifest.project.as_str())?;

        let mut report = self.discover(&project, manifest)?;
        report.categories_changed = self.take_changed();
        info!(
            elements = report.elements.len(),
            changed = report.categories_changed.len(),
            "discovery pass finished"
        );
        Ok(report)
    }

    /// Mark every stored element invalid, as a rescan does before it starts.
    pub fn invalidate_all(&self) -> anyhow::Result<usize> {
        Ok(self.store.invalidate_all()?)
    }

    fn discover(&self, project: &ProjectId, manifest: &Manifest) -> anyhow::Result<PassReport> {
        let factory = &self.factory;
        let mut report = PassReport::default();

        for assembly in &manifest.assemblies {
            for suite in &assembly.suites {
                let discovery = SuiteDiscovery {
                    type_name: suite.type_name.clone(),
                    assembly_location: assembly.path.clone(),
                    subject: suite.subject.clone(),
                    tags: suite.tags.clone(),
                    category_source: suite.source,
                    ignored: suite.ignored,
                    explicit: suite.explicit,
                };
                let parent = factory.get_or_create_suite(project, &discovery)?.element;
                self.accept(&parent, &mut report)?;

                for case in &suite.cases {
                    let element = factory.get_or_create_suite_case(
                        project,
                        &parent,
                        &suite.type_name,
                        case.name(),
                        case.ignored(),
                    )?;
                    self.accept(&element, &mut report)?;
                }

                for grouping in &suite.groupings {
                    let group = factory.get_or_create_grouping(
                        project,
                        &parent,
                        &suite.type_name,
                        &grouping.field,
                        grouping.ignored,
                    )?;
                    self.accept(&group, &mut report)?;

                    for case in &grouping.cases {
                        let element = factory.get_or_create_grouping_case(
                            project,
                            &group,
                            &suite.type_name,
                            &grouping_case_member(&grouping.field, case),
                            case.ignored(),
                        )?;
                        self.accept(&element, &mut report)?;
                    }
                }
            }
        }
        Ok(report)
    }

    fn accept(&self, element: &ElementRef, report: &mut PassReport) -> anyhow::Result<()> {
        element.set_state(ElementState::Valid);
        self.store.insert(element.clone())?;
        report.elements.insert(element.id().clone(), element.clone());
        Ok(())
    }

    fn take_changed(&self) -> Vec<ElementId> {
        std::mem::take(&mut *self.changed.lock())
    }

    /// Id a suite of `project` would get in this session.
    #[cfg(test)]
    pub fn suite_id(&self, project: &ProjectId, type_name: &testtree_types::TypeName) -> ElementId {
        ElementId::for_type(self.factory.scope(project), type_name)
    }
}

/// Grouping cases are keyed under the suite type, qualified by the grouping
/// field so two groupings can declare cases with the same name.
fn grouping_case_member(field: &str, case: &CaseManifest) -> String {
    format!("{field}.{}", case.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use testtree_types::TypeName;

    const BEFORE: &str = r#"
project = "Sample.Tests"
target = "net8.0"

[[assembly]]
path = "bin/Sample.Tests.dll"

[[assembly.suite]]
type = "Sample.When_adding"
cases = ["should_add", "should_carry"]

[[assembly.suite.grouping]]
field = "behaves_like_a_calculator"
cases = ["should_not_throw"]
"#;

    const AFTER: &str = r#"
project = "Sample.Tests"
target = "net8.0"

[[assembly]]
path = "bin/Release/Sample.Tests.dll"

[[assembly.suite]]
type = "Sample.When_adding"
tags = ["slow"]
explicit = true
cases = ["should_add"]

[[assembly.suite.grouping]]
field = "behaves_like_a_calculator"
cases = ["should_not_throw"]
"#;

    fn session() -> Session {
        Session::new("net8.0", FactoryConfig::default()).unwrap()
    }

    #[test]
    fn single_pass_stores_every_element() {
        let session = session();
        let report = session.run_pass(&Manifest::parse(BEFORE).unwrap()).unwrap();
        assert_eq!(report.elements.len(), 5);
        assert_eq!(session.store().len().unwrap(), 5);
        assert!(report.categories_changed.is_empty());
    }

    #[test]
    fn rescan_reuses_prunes_and_retags() {
        let session = session();
        let first = session.run_pass(&Manifest::parse(BEFORE).unwrap()).unwrap();
        session.invalidate_all().unwrap();
        let second = session.run_pass(&Manifest::parse(AFTER).unwrap()).unwrap();

        for (id, element) in &second.elements {
            assert!(Arc::ptr_eq(element, &first.elements[id]));
            assert_eq!(element.state(), ElementState::Valid);
        }
        assert_eq!(second.categories_changed.len(), 1);

        let dropped: Vec<&ElementId> = first
            .elements
            .keys()
            .filter(|id| !second.elements.contains_key(*id))
            .collect();
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].member(), Some("should_carry"));
        assert!(!session.store().contains(dropped[0]).unwrap());
    }

    #[test]
    fn changed_suites_are_reported_once_per_pass() {
        let session = session();
        session.run_pass(&Manifest::parse(BEFORE).unwrap()).unwrap();

        let tagged = session.run_pass(&Manifest::parse(AFTER).unwrap()).unwrap();
        let project = ProjectId::new("Sample.Tests").unwrap();
        let suite_id = session.suite_id(&project, &TypeName::new("Sample.When_adding").unwrap());
        assert_eq!(tagged.categories_changed, vec![suite_id]);

        let repeat = session.run_pass(&Manifest::parse(AFTER).unwrap()).unwrap();
        assert!(repeat.categories_changed.is_empty());
    }

    #[test]
    fn explicit_suite_ignores_existing_cases_at_read_time() {
        let session = session();
        let first = session.run_pass(&Manifest::parse(BEFORE).unwrap()).unwrap();
        session.run_pass(&Manifest::parse(AFTER).unwrap()).unwrap();

        let project = ProjectId::new("Sample.Tests").unwrap();
        let suite_id = session.suite_id(&project, &TypeName::new("Sample.When_adding").unwrap());
        let suite = &first.elements[&suite_id];
        assert!(suite.as_suite().unwrap().is_explicit());

        let case = first
            .elements
            .values()
            .find(|e| e.id().member() == Some("should_add"))
            .unwrap();
        assert!(!case.ignored());
        assert!(case.effective_ignored());
    }

    #[test]
    fn target_mismatch_is_rejected() {
        let session = Session::new("net472", FactoryConfig::default()).unwrap();
        let err = session.run_pass(&Manifest::parse(BEFORE).unwrap()).unwrap_err();
        assert!(err.to_string().contains("net472"));
    }
}
