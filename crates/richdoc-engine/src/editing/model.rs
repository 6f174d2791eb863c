use super::history::{History, Snapshot};
use super::mutator::Mutator;
use super::patch::Patch;
use crate::dom::{Dom, DomNodeId, DomSelection, html, markdown};
use crate::error::{ModelError, Result};
use crate::model::{
    ComponentRegistry, ComponentSpec, DirtyFlags, MarkSpec, MarksRegistry, NodeId, Outline, Tree,
    default_components, default_specs,
};
use crate::range::Range;
use crate::readers::{ReaderContext, SelectionReader, read_root};
use crate::registry::{NodeView, ViewRegistry};
use crate::selection::Selection;
use crate::writers::{WriterContext, dom_attributes, write_children, write_node, write_selection};

/// Engine-level knobs.
#[derive(Debug, Clone)]
pub struct ModelOptions {
    /// Collapse HTML whitespace while reading
    pub convert_whitespace: bool,
    /// Snapshots kept for undo; the oldest is dropped first
    pub history_limit: usize,
    pub marks: Vec<MarkSpec>,
    pub components: Vec<ComponentSpec>,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            convert_whitespace: true,
            history_limit: 100,
            marks: default_specs(),
            components: default_components(),
        }
    }
}

/// The editing context bound to one external tree.
///
/// Owns the model tree and its selection, the external tree they are read
/// from and written to, the registry linking the two, and the undo history.
#[derive(Debug)]
pub struct Model {
    tree: Tree,
    root: NodeId,
    selection: Selection,
    dom: Dom,
    dom_root: DomNodeId,
    dom_selection: DomSelection,
    registry: ViewRegistry,
    marks: MarksRegistry,
    components: ComponentRegistry,
    history: History,
    options: ModelOptions,
    version: u64,
}

impl Model {
    /// Binds a model to `dom_root` and reads it right away.
    pub fn new(dom: Dom, dom_root: DomNodeId, options: ModelOptions) -> Result<Self> {
        let mut tree = Tree::new();
        let root = tree.create_element("div");
        let mut model = Self {
            tree,
            root,
            selection: Selection::new(),
            dom,
            dom_root,
            dom_selection: DomSelection::default(),
            registry: ViewRegistry::new(),
            marks: MarksRegistry::with_specs(options.marks.clone()),
            components: ComponentRegistry::with_specs(options.components.clone()),
            history: History::new(options.history_limit),
            options,
            version: 0,
        };
        model.read(false)?;
        Ok(model)
    }

    /// A model over a fresh, empty `div`.
    pub fn empty(options: ModelOptions) -> Result<Self> {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        Self::new(dom, root, options)
    }

    pub fn from_markdown(source: &str, options: ModelOptions) -> Result<Self> {
        let mut dom = Dom::new();
        let root = markdown::from_markdown(&mut dom, source);
        Self::new(dom, root, options)
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn select_range(&mut self, range: Range) {
        self.selection.select_range(range);
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// Direct access for the embedding surface. Call [`read`](Self::read)
    /// afterwards so the model picks the edits up.
    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    pub fn dom_root(&self) -> DomNodeId {
        self.dom_root
    }

    /// The external selection produced by the last write.
    pub fn dom_selection(&self) -> DomSelection {
        self.dom_selection
    }

    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    pub fn marks(&self) -> &MarksRegistry {
        &self.marks
    }

    pub fn register_mark(&mut self, spec: MarkSpec) {
        self.marks.register(spec);
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub fn register_component(&mut self, spec: ComponentSpec) {
        self.components.register(spec);
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn to_html(&self) -> String {
        html::to_html(&self.dom, self.dom_root)
    }

    pub fn outline(&self) -> Option<Outline> {
        crate::model::outline(&self.tree, self.root)
    }

    // --- reading ---

    /// Rebuilds the model from the external tree. The selection is read
    /// from `dom_selection` when `read_selection` is set and cleared
    /// otherwise. On failure the model is left as it was.
    pub fn read(&mut self, read_selection: bool) -> Result<()> {
        let mut tree = Tree::new();
        let mut registry = ViewRegistry::new();
        let root = {
            let mut ctx = ReaderContext::new(
                &mut tree,
                &self.marks,
                &mut registry,
                self.options.convert_whitespace,
            )
            .with_components(&self.components);
            read_root(&self.dom, self.dom_root, &mut ctx)?
        };
        tree.clear_dirty_subtree(root);

        let selection = if read_selection && !self.dom_selection.is_empty() {
            SelectionReader::new(&tree, root, &self.dom, &registry).read(&self.dom_selection)?
        } else {
            Selection::new()
        };

        log::debug!("Read {} model nodes from {}", tree.len(), self.dom_root);
        self.tree = tree;
        self.root = root;
        self.registry = registry;
        self.selection = selection;
        Ok(())
    }

    /// Replaces the model selection with the reading of `selection`.
    pub fn read_selection(&mut self, selection: &DomSelection) -> Result<()> {
        self.selection =
            SelectionReader::new(&self.tree, self.root, &self.dom, &self.registry).read(selection)?;
        self.dom_selection = *selection;
        Ok(())
    }

    // --- writing ---

    /// Writes `subtree` (the whole document when `None`) back to the
    /// external tree, then drops external nodes no longer attached.
    pub fn write(&mut self, subtree: Option<NodeId>, write_selection: bool) -> Result<()> {
        let target = subtree.filter(|node| *node != self.root);
        match target {
            Some(node) => self.write_subtree(node)?,
            None => self.write_root()?,
        }

        let collected = self.dom.retain_reachable(&[self.dom_root]);
        let pruned = self.registry.prune(&self.tree, &self.dom);
        log::debug!(
            "Wrote {}; dropped {collected} external nodes and {pruned} registry entries",
            target.unwrap_or(self.root)
        );

        if write_selection {
            self.write_selection()?;
        }
        Ok(())
    }

    /// The root view is never replaced: its attributes and children are
    /// updated in place.
    fn write_root(&mut self) -> Result<()> {
        let root = self.root;
        let dom_root = self.dom_root;
        self.registry.register(root, NodeView::single(dom_root));
        let dirty = self.tree.dirtiness(root);

        let mut ctx = WriterContext {
            tree: &mut self.tree,
            dom: &mut self.dom,
            registry: &mut self.registry,
            marks: &self.marks,
            components: &self.components,
        };
        if dirty.node || dirty.attributes {
            let attributes = dom_attributes(ctx.tree, root);
            ctx.dom.set_attributes(dom_root, attributes)?;
        }
        if !dirty.is_clean() {
            let children = write_children(&mut ctx, root)?;
            ctx.dom.set_children(dom_root, children)?;
        }
        ctx.dom.set_dirty(dom_root, dirty)?;
        ctx.tree.clear_dirty(root);
        Ok(())
    }

    fn write_subtree(&mut self, node: NodeId) -> Result<()> {
        if self.tree.root_of(node) != self.root {
            return Err(ModelError::DifferentRoots);
        }
        // A text view may sit inside a wrapper shared with its siblings, so
        // texts are placed by re-listing their parent
        let mut node = node;
        while self.tree.is_text(node)
            && let Some(parent) = self.tree.parent(node)
        {
            self.tree.mark_dirty(parent, DirtyFlags::CONTENT)?;
            node = parent;
        }
        if node == self.root {
            return self.write_root();
        }
        let old_view = self
            .registry
            .model_to_view(node)
            .map(|view| view.view_root)
            .filter(|view| self.dom.contains(*view));
        let Some(old_view) = old_view else {
            // Never written before; only its parent can place it
            log::debug!("{node} has no view yet, writing the whole document");
            return self.write_root();
        };

        let mut ctx = WriterContext {
            tree: &mut self.tree,
            dom: &mut self.dom,
            registry: &mut self.registry,
            marks: &self.marks,
            components: &self.components,
        };
        let new_view = write_node(&mut ctx, node)?;
        if new_view != old_view
            && let Some(parent) = self.dom.parent(old_view)
        {
            self.dom.replace_child(parent, old_view, new_view)?;
        }
        Ok(())
    }

    /// Materialises the model selection as an external selection.
    pub fn write_selection(&mut self) -> Result<()> {
        self.dom_selection = write_selection(&self.tree, &self.dom, &self.registry, &self.selection)?;
        Ok(())
    }

    /// Like [`write_selection`](Self::write_selection), but a selection that
    /// no longer maps onto the document is dropped instead of failing.
    fn sync_selection(&mut self) {
        if let Err(err) = self.write_selection() {
            log::warn!("Dropping selection that no longer maps onto the document: {err}");
            self.selection.clear();
            self.dom_selection = DomSelection::default();
        }
    }

    // --- changes ---

    /// Runs `f` against the tree and writes the result back.
    pub fn change<F>(&mut self, f: F) -> Result<Patch>
    where
        F: FnOnce(&mut Mutator<'_>) -> Result<Option<NodeId>>,
    {
        self.change_with(true, f)
    }

    /// Runs `f` against the tree. `f` may return the subtree it confined its
    /// edits to; otherwise the whole document is written. With `write_back`
    /// unset the external tree is left alone until the next
    /// [`write`](Self::write).
    ///
    /// An error from `f` aborts the scope before write-back and leaves the
    /// tree as `f` left it.
    pub fn change_with<F>(&mut self, write_back: bool, f: F) -> Result<Patch>
    where
        F: FnOnce(&mut Mutator<'_>) -> Result<Option<NodeId>>,
    {
        let subtree = {
            let mut mutator =
                Mutator::new(&mut self.tree, &mut self.selection, &self.marks, self.root);
            f(&mut mutator)?
        };
        self.version += 1;
        let collected = self.tree.retain_reachable(&[self.root]);
        log::debug!("Change {} collected {collected} detached nodes", self.version);

        let written = if write_back {
            let target = subtree.filter(|node| self.tree.contains(*node));
            self.write(target, false)?;
            self.sync_selection();
            Some(target.unwrap_or(self.root))
        } else {
            None
        };

        Ok(Patch {
            written,
            new_selection: self.dom_selection,
            version: self.version,
        })
    }

    // --- history ---

    pub fn create_snapshot(&self) -> Snapshot {
        Snapshot::new(self.tree.clone(), self.root, self.selection.clone())
    }

    /// Pushes the current state onto the undo history.
    pub fn save_snapshot(&mut self) {
        self.history.push(self.create_snapshot());
        log::debug!("Saved snapshot, undo depth {}", self.history.len());
    }

    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Pops the latest snapshot and makes it current. Returns `None` when
    /// there is nothing to restore.
    pub fn restore_snapshot(&mut self, write_back: bool) -> Result<Option<Patch>> {
        let Some(snapshot) = self.history.pop() else {
            log::warn!("No snapshot to restore");
            return Ok(None);
        };
        log::debug!("Restoring snapshot, undo depth {}", self.history.len());
        self.restore_from(snapshot, write_back).map(Some)
    }

    /// Makes `snapshot` current. Every restored node is treated as new, so
    /// write-back rebuilds the whole external subtree.
    pub fn restore_from(&mut self, snapshot: Snapshot, write_back: bool) -> Result<Patch> {
        let (tree, root, selection) = snapshot.into_parts();
        self.tree = tree;
        self.root = root;
        self.selection = selection;
        self.tree.mark_subtree_dirty(root, DirtyFlags::NEW);
        self.version += 1;

        let written = if write_back {
            self.write(None, false)?;
            self.sync_selection();
            Some(root)
        } else {
            None
        };
        Ok(Patch {
            written,
            new_selection: self.dom_selection,
            version: self.version,
        })
    }

    // --- view lookups ---

    pub fn register_node_view(&mut self, node: NodeId, view: NodeView) {
        self.registry.register(node, view);
    }

    pub fn model_to_view(&self, node: NodeId) -> Result<NodeView> {
        self.registry
            .model_to_view(node)
            .filter(|view| self.dom.contains(view.view_root))
            .ok_or(ModelError::NoViewForNode(node))
    }

    /// The model node rendered as `view` or as its nearest mapped ancestor.
    pub fn view_to_model(&self, view: DomNodeId) -> Result<NodeId> {
        self.registry
            .view_to_model(&self.dom, view)
            .filter(|node| self.tree.contains(*node))
            .ok_or(ModelError::NoModelForView(view))
    }
}
