use thiserror::Error;

mod graph;
mod node;

pub use graph::SceneGraph;
pub use node::{NodeId, SceneNode};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("unknown scene node {0}")]
    UnknownNode(NodeId),
    #[error("parenting {child} under {parent} would create a cycle")]
    Cycle { child: NodeId, parent: NodeId },
    #[error("parent frame of {0} is not invertible")]
    SingularFrame(NodeId),
}

pub type Result<T> = std::result::Result<T, Error>;
