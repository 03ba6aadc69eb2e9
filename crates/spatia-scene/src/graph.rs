use cgmath::{EuclideanSpace, SquareMatrix, Transform as _};
use spatia_geometry::{Aabb, Mat4, Point, Transform, merge_bounds};
use tracing::trace;

use crate::node::{NodeId, SceneNode};
use crate::{Error, Result};

#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<SceneNode>,
}

/// Arena-backed node hierarchy. Nodes are addressed by [`NodeId`] handles
/// rather than by reference, so indices keyed on them stay sound while the
/// hierarchy mutates.
#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn spawn(&mut self, name: impl Into<String>, transform: Transform) -> NodeId {
        let node = SceneNode::new(name.into(), transform);
        self.len += 1;
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        };
        trace!(node = %id, "spawned scene node");
        id
    }

    pub fn spawn_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        transform: Transform,
    ) -> Result<NodeId> {
        if !self.contains(parent) {
            return Err(Error::UnknownNode(parent));
        }
        let child = self.spawn(name, transform);
        self.set_parent(child, Some(parent))?;
        Ok(child)
    }

    /// Removes `node` and its whole subtree. Returns the removed handles in
    /// pre-order.
    pub fn despawn(&mut self, node: NodeId) -> Result<Vec<NodeId>> {
        if !self.contains(node) {
            return Err(Error::UnknownNode(node));
        }
        self.detach(node);
        let removed = self.subtree(node);
        for id in &removed {
            let slot = &mut self.slots[id.index as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
            self.len -= 1;
        }
        trace!(node = %node, removed = removed.len(), "despawned scene subtree");
        Ok(removed)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(Error::UnknownNode(id))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|node| node.children()).unwrap_or(&[])
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.slots.iter().enumerate().find_map(|(index, slot)| {
            let node = slot.node.as_ref()?;
            (node.name == name).then_some(NodeId {
                index: index as u32,
                generation: slot.generation,
            })
        })
    }

    /// Re-parents `child`, or detaches it to the root when `parent` is `None`.
    /// The local transform is kept as-is.
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> Result<()> {
        if !self.contains(child) {
            return Err(Error::UnknownNode(child));
        }
        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(Error::UnknownNode(parent));
            }
            if self.subtree_contains(child, parent) {
                return Err(Error::Cycle { child, parent });
            }
        }

        self.detach(child);
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.push(child);
        }
        self.node_mut(child)?.parent = parent;
        Ok(())
    }

    fn detach(&mut self, child: NodeId) {
        let Some(old_parent) = self.parent(child) else {
            return;
        };
        if let Ok(node) = self.node_mut(old_parent) {
            node.children.retain(|id| *id != child);
        }
        if let Ok(node) = self.node_mut(child) {
            node.parent = None;
        }
    }

    /// Pre-order traversal of `root` and every current descendant.
    pub fn subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(root) {
            return out;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Whether `target` is `root` or one of its descendants. Walks the parent
    /// chain from `target`, so cost is bounded by its depth.
    pub fn subtree_contains(&self, root: NodeId, target: NodeId) -> bool {
        if !self.contains(root) || !self.contains(target) {
            return false;
        }
        std::iter::successors(Some(target), |id| self.parent(*id)).any(|id| id == root)
    }

    pub fn transform(&self, id: NodeId) -> Option<Transform> {
        self.node(id).map(|node| node.transform)
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> Result<()> {
        self.node_mut(id)?.transform = transform;
        Ok(())
    }

    pub fn set_bounds(&mut self, id: NodeId, bounds: Option<Aabb>) -> Result<()> {
        self.node_mut(id)?.bounds = bounds;
        Ok(())
    }

    pub fn is_enabled(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| node.enabled)
    }

    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> Result<()> {
        self.node_mut(id)?.enabled = enabled;
        Ok(())
    }

    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let node = self.node(id)?;
        let mut matrix = node.transform.matrix();
        let mut current = node.parent;
        while let Some(parent) = current {
            let node = self.node(parent)?;
            matrix = node.transform.matrix() * matrix;
            current = node.parent;
        }
        Some(matrix)
    }

    pub fn world_position(&self, id: NodeId) -> Option<Point> {
        self.world_matrix(id)
            .map(|matrix| matrix.transform_point(Point::origin()))
    }

    /// Moves `id` so its origin lands on `position`, expressed in world space.
    pub fn set_world_position(&mut self, id: NodeId, position: Point) -> Result<()> {
        let parent = self.node(id).ok_or(Error::UnknownNode(id))?.parent;
        let local = match parent {
            Some(parent) => {
                let frame = self
                    .world_matrix(parent)
                    .ok_or(Error::UnknownNode(parent))?;
                let inverse = frame.invert().ok_or(Error::SingularFrame(id))?;
                inverse.transform_point(position)
            }
            None => position,
        };
        self.node_mut(id)?.transform.translation = local.to_vec();
        Ok(())
    }

    /// World-space box covering every bounded node in the subtree of `id`.
    pub fn visual_bounds(&self, id: NodeId) -> Option<Aabb> {
        self.subtree(id).into_iter().fold(None, |acc, node| {
            let world = self
                .node(node)
                .and_then(|n| n.bounds)
                .zip(self.world_matrix(node))
                .map(|(bounds, matrix)| bounds.transformed(&matrix));
            merge_bounds(acc, world)
        })
    }
}
