//! Link from a parent DAG node to a child.

use crate::dag::cid::Cid;
use serde::{Deserialize, Serialize};

/// A named, sized reference to a child node.
///
/// `name` only has to be unique among siblings of the same parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Address of the target object
    #[serde(rename = "Cid")]
    pub cid: Cid,
    #[serde(rename = "Name")]
    pub name: String,
    /// Cumulative size of the target object
    #[serde(rename = "Size")]
    pub size: u64,
}
