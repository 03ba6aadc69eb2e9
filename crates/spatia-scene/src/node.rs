use serde::{Deserialize, Serialize};
use spatia_geometry::{Aabb, Transform};

/// Stable handle into a [`crate::SceneGraph`]. A despawned slot bumps its
/// generation, so old handles never alias a node spawned later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) transform: Transform,
    /// Visual bounds in the node's own local space.
    pub(crate) bounds: Option<Aabb>,
    pub(crate) enabled: bool,
}

impl SceneNode {
    pub(crate) fn new(name: String, transform: Transform) -> Self {
        Self {
            name,
            parent: None,
            children: Vec::new(),
            transform,
            bounds: None,
            enabled: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
