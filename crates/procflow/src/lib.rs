//! Procflow - auto-layout, edge routing and structural diffing for process-flow graphs.
//!
//! A process is a directed graph of steps, decisions and start/end events.
//! This crate lays such graphs out in ranks, decides how every transition is
//! drawn (including decision branches, self-loops and back edges), and
//! compares two processes node by node and edge by edge.
//!
//! The [`Workbench`] owns a collection of process documents and sequences the
//! pieces: explicit layout requests, change detection, comparison and scene
//! output. The individual stages are also usable on their own through the
//! [`layout`], [`routing`], [`diff`] and [`scene`] modules.

pub mod config;
pub mod diff;
pub mod label;
pub mod layout;
pub mod routing;
pub mod scene;

mod error;

pub use procflow_core::{color, document, geometry, identifier, stroke};

pub use error::FlowError;

use indexmap::IndexMap;
use log::{debug, info, warn};

use config::AppConfig;
use diff::{Comparison, DiffResult};
use document::GraphDocument;
use identifier::Id;
use layout::Direction;
use scene::Scene;

/// Parses a document collection from JSON.
///
/// The input is either an array of documents or a single document object,
/// which is read as a collection of one.
///
/// # Errors
///
/// Returns [`FlowError::Parse`] if the input is not a valid document or
/// collection. The error keeps the input so the problem can be shown in place.
///
/// # Examples
///
/// ```
/// let documents = procflow::parse_collection(r#"{"id": "p1", "name": "One"}"#).unwrap();
/// assert_eq!(documents.len(), 1);
/// assert!(procflow::parse_collection("[{").is_err());
/// ```
pub fn parse_collection(json: &str) -> Result<Vec<GraphDocument>, FlowError> {
    let parsed = if json.trim_start().starts_with('[') {
        serde_json::from_str(json)
    } else {
        serde_json::from_str(json).map(|document| vec![document])
    };
    parsed.map_err(|err| FlowError::new_parse_error(err, json))
}

/// Owner of a process document collection.
///
/// Tracks the selected document, the optional comparison target and the
/// layout trigger counter. Documents are replaced wholesale on every change;
/// the comparison between the selected document and the target is recomputed
/// whenever either of them changes.
///
/// # Examples
///
/// ```rust
/// use procflow::{Workbench, config::AppConfig};
///
/// let json = r#"[{
///     "id": "p1",
///     "name": "Onboarding",
///     "nodes": [
///         {"id": "a", "kind": "start", "label": "Start"},
///         {"id": "b", "kind": "end", "label": "Done"}
///     ],
///     "edges": [{"id": "e1", "sourceId": "a", "targetId": "b", "label": ""}]
/// }]"#;
///
/// let mut workbench = Workbench::new(AppConfig::default());
/// workbench.load(procflow::parse_collection(json).unwrap());
/// workbench.relayout();
///
/// let scene = workbench.selected_scene().unwrap();
/// assert_eq!(scene.nodes().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Workbench {
    config: AppConfig,
    documents: IndexMap<Id, GraphDocument>,
    selected: Option<Id>,
    comparison_target: Option<Id>,
    comparison: Option<Comparison>,
    layout_trigger: u64,
}

impl Workbench {
    /// Create an empty workbench with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Layout and routing configuration
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Adds documents to the collection.
    ///
    /// A document whose id is already present replaces the earlier one.
    /// Structural problems are logged, not rejected. The first document
    /// becomes the selection if nothing is selected yet.
    pub fn load(&mut self, documents: Vec<GraphDocument>) {
        for document in documents {
            if let Err(err) = document.validate() {
                warn!(
                    document_id = document.id().to_string(),
                    problem = err.to_string();
                    "Document has structural problems"
                );
            }
            if self.documents.insert(document.id(), document).is_some() {
                warn!("Duplicate document id replaced an earlier document");
            }
        }
        if self.selected.is_none() {
            self.selected = self.documents.keys().next().copied();
        }
        self.refresh_comparison();

        info!(documents_count = self.documents.len(); "Documents loaded");
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn documents(&self) -> impl Iterator<Item = &GraphDocument> {
        self.documents.values()
    }

    pub fn document(&self, id: Id) -> Option<&GraphDocument> {
        self.documents.get(&id)
    }

    pub fn selected_id(&self) -> Option<Id> {
        self.selected
    }

    pub fn selected(&self) -> Option<&GraphDocument> {
        self.selected.and_then(|id| self.documents.get(&id))
    }

    pub fn comparison_target(&self) -> Option<Id> {
        self.comparison_target
    }

    /// Current value of the layout trigger counter.
    pub fn layout_trigger(&self) -> u64 {
        self.layout_trigger
    }

    /// Direction selected by the current trigger value.
    pub fn direction(&self) -> Direction {
        Direction::from_trigger(self.layout_trigger)
    }

    /// Selects the document shown in the main pane.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::UnknownDocument`] if no document has this id.
    pub fn select(&mut self, id: Id) -> Result<(), FlowError> {
        self.ensure_known(id)?;
        self.selected = Some(id);
        self.refresh_comparison();
        Ok(())
    }

    /// Sets or clears the document the selection is compared against.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::UnknownDocument`] if no document has this id.
    pub fn set_comparison_target(&mut self, target: Option<Id>) -> Result<(), FlowError> {
        if let Some(id) = target {
            self.ensure_known(id)?;
        }
        self.comparison_target = target;
        self.refresh_comparison();
        Ok(())
    }

    /// Equivalent ids of the selected document, while a comparison is active.
    pub fn diff_result(&self) -> Option<DiffResult> {
        self.comparison.as_ref().map(Comparison::left)
    }

    /// Equivalent ids of the comparison target, while a comparison is active.
    pub fn target_diff_result(&self) -> Option<DiffResult> {
        self.comparison.as_ref().map(Comparison::right)
    }

    /// Replaces a document with an edited snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::UnknownDocument`] if the collection has no
    /// document with the snapshot's id.
    pub fn replace_document(&mut self, document: GraphDocument) -> Result<(), FlowError> {
        let id = document.id();
        let slot = self
            .documents
            .get_mut(&id)
            .ok_or(FlowError::UnknownDocument(id))?;
        *slot = document;
        self.after_change(id);
        Ok(())
    }

    /// Applies an edit to a copy of a document and stores the result.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::UnknownDocument`] if no document has this id.
    pub fn edit<R>(
        &mut self,
        id: Id,
        edit: impl FnOnce(&mut GraphDocument) -> R,
    ) -> Result<R, FlowError> {
        let mut snapshot = self
            .documents
            .get(&id)
            .cloned()
            .ok_or(FlowError::UnknownDocument(id))?;
        let result = edit(&mut snapshot);
        self.documents.insert(id, snapshot);
        self.after_change(id);
        Ok(result)
    }

    /// Advances the layout trigger and lays out with the new direction.
    ///
    /// Returns the direction used.
    pub fn request_layout(&mut self) -> Direction {
        self.layout_trigger += 1;
        self.relayout();
        self.direction()
    }

    /// Lays out the selected document and the comparison target with the
    /// current direction.
    ///
    /// Returns how many documents actually changed; layouts without a
    /// material change are discarded.
    pub fn relayout(&mut self) -> usize {
        let direction = self.direction();
        let mut targets: Vec<Id> = self.selected.into_iter().collect();
        if let Some(target) = self.comparison_target.filter(|id| !targets.contains(id)) {
            targets.push(target);
        }

        let mut changed = 0;
        for id in targets {
            let Some(document) = self.documents.get(&id) else {
                continue;
            };
            let result = layout::layout(
                document.nodes(),
                document.edges(),
                direction,
                self.config.layout(),
            );
            if let Some(updated) = layout::apply_layout(document, &result) {
                self.documents.insert(id, updated);
                changed += 1;
            }
        }

        if changed > 0 {
            self.refresh_comparison();
        }
        debug!(
            direction = direction.to_string(),
            trigger = self.layout_trigger,
            changed_documents = changed;
            "Layout pass finished"
        );
        changed
    }

    /// Scene of any document in the collection.
    ///
    /// Comparison flags are filled in for the selected document and the
    /// comparison target while a comparison is active.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::UnknownDocument`] if no document has this id.
    pub fn scene(&self, id: Id) -> Result<Scene, FlowError> {
        let document = self
            .documents
            .get(&id)
            .ok_or(FlowError::UnknownDocument(id))?;

        let equivalence = if Some(id) == self.selected {
            self.diff_result()
        } else if Some(id) == self.comparison_target {
            self.target_diff_result()
        } else {
            None
        };

        Ok(Scene::build(
            document,
            self.direction(),
            equivalence.as_ref(),
            self.config.routing(),
        ))
    }

    /// Scene of the selected document.
    pub fn selected_scene(&self) -> Option<Scene> {
        self.selected.and_then(|id| self.scene(id).ok())
    }

    /// Scene of the comparison target, while one is set.
    pub fn comparison_scene(&self) -> Option<Scene> {
        self.comparison_target
            .and_then(|id| self.scene(id).ok())
    }

    /// Serializes the whole collection to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Json`] if serialization fails.
    pub fn export_json(&self) -> Result<String, FlowError> {
        let documents: Vec<&GraphDocument> = self.documents.values().collect();
        Ok(serde_json::to_string_pretty(&documents)?)
    }

    fn ensure_known(&self, id: Id) -> Result<(), FlowError> {
        if self.documents.contains_key(&id) {
            Ok(())
        } else {
            Err(FlowError::UnknownDocument(id))
        }
    }

    fn after_change(&mut self, id: Id) {
        if Some(id) == self.selected || Some(id) == self.comparison_target {
            self.refresh_comparison();
        }
    }

    fn refresh_comparison(&mut self) {
        self.comparison = match (self.selected, self.comparison_target) {
            (Some(selected), Some(target)) => {
                match (self.documents.get(&selected), self.documents.get(&target)) {
                    (Some(left), Some(right)) => Some(Comparison::new(left, right)),
                    _ => None,
                }
            }
            _ => None,
        };
    }
}
