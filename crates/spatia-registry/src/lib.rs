use serde::{Deserialize, Serialize};
use spatia_base::Guid;
use spatia_scene::{NodeId, SceneGraph};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A named, gesture-interactable object backed by one scene node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackedObject {
    pub id: Guid,
    pub node: NodeId,
    pub name: String,
}

impl TrackedObject {
    pub fn new(node: NodeId, name: impl Into<String>) -> Self {
        Self {
            id: Guid::new(),
            node,
            name: name.into(),
        }
    }
}

/// Which lookup path answered a [`EntityRegistry::resolve`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolvePath {
    Index,
    Ancestor,
    Subtree,
}

/// Maps scene nodes back to the tracked objects they belong to.
///
/// The node index is filled from the subtree present at registration time
/// and is not kept in sync with later hierarchy edits; `resolve` falls back
/// to a parent walk and then a full subtree search to cover that.
#[derive(Clone, Debug, Default)]
pub struct EntityRegistry {
    objects: HashMap<String, TrackedObject>,
    order: Vec<String>,
    node_index: HashMap<NodeId, String>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of node handles currently in the fast index.
    pub fn index_len(&self) -> usize {
        self.node_index.len()
    }

    /// Registers `node` under `name`. An existing object with the same name
    /// is replaced and its index rows are dropped first.
    pub fn register(
        &mut self,
        scene: &SceneGraph,
        node: NodeId,
        name: impl Into<String>,
    ) -> &TrackedObject {
        let name = name.into();
        if let Some(previous) = self.objects.get(&name) {
            warn!(name = %name, previous = %previous.node, node = %node, "replacing tracked object");
            self.node_index.retain(|_, owner| *owner != name);
        } else {
            self.order.push(name.clone());
        }

        for id in scene.subtree(node) {
            self.node_index.insert(id, name.clone());
        }
        debug!(name = %name, node = %node, indexed = self.node_index.len(), "registered tracked object");

        self.objects
            .entry(name.clone())
            .insert_entry(TrackedObject::new(node, name))
            .into_mut()
    }

    /// Removes the object and un-indexes its current subtree.
    pub fn unregister(&mut self, scene: &SceneGraph, name: &str) -> Option<TrackedObject> {
        let object = self.objects.remove(name)?;
        self.order.retain(|entry| entry != name);
        for id in scene.subtree(object.node) {
            self.node_index.remove(&id);
        }
        // Rows for nodes that left the hierarchy after registration.
        self.node_index.retain(|_, owner| owner != name);
        debug!(name, node = %object.node, "unregistered tracked object");
        Some(object)
    }

    pub fn lookup(&self, name: &str) -> Option<&TrackedObject> {
        self.objects.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    /// Objects in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackedObject> {
        self.order.iter().filter_map(|name| self.objects.get(name))
    }

    pub fn resolve(&self, scene: &SceneGraph, hit: NodeId) -> Option<&TrackedObject> {
        self.resolve_with_path(scene, hit).map(|(object, _)| object)
    }

    /// Like [`Self::resolve`], also reporting which path produced the match.
    pub fn resolve_with_path(
        &self,
        scene: &SceneGraph,
        hit: NodeId,
    ) -> Option<(&TrackedObject, ResolvePath)> {
        if let Some(object) = self.indexed(hit) {
            return Some((object, ResolvePath::Index));
        }

        let mut current = scene.parent(hit);
        while let Some(id) = current {
            if let Some(object) = self.indexed(id) {
                debug!(hit = %hit, ancestor = %id, name = %object.name, "resolved through ancestor");
                return Some((object, ResolvePath::Ancestor));
            }
            current = scene.parent(id);
        }

        let found = self
            .iter()
            .find(|object| scene.subtree_contains(object.node, hit));
        match found {
            Some(object) => {
                debug!(hit = %hit, name = %object.name, "resolved through subtree search");
                Some((object, ResolvePath::Subtree))
            }
            None => {
                debug!(hit = %hit, "no tracked object under hit node");
                None
            }
        }
    }

    fn indexed(&self, node: NodeId) -> Option<&TrackedObject> {
        self.node_index
            .get(&node)
            .and_then(|name| self.objects.get(name))
    }
}
