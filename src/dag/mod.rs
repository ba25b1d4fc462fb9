//! Merkle DAG value types
//!
//! Content identifiers, the links that reference children from a parent
//! node, and the wire payload used to materialize a directory node.

pub mod cid;
pub mod link;
pub mod node;

pub use cid::Cid;
pub use link::Link;
pub use node::DagNode;
