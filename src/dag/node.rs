//! Directory node payload for `dag/put`.

use crate::dag::link::Link;
use serde::Serialize;

/// Fixed protobuf `Data` field of a UnixFS directory, base64 encoded.
pub const DIRECTORY_DATA: &str = "CAE=";

/// JSON body sent to the gateway to materialize a directory node.
///
/// Exists only as a serialized request body; links keep the order they
/// were given in.
#[derive(Debug, Serialize)]
pub struct DagNode<'a> {
    pub data: &'static str,
    pub links: &'a [Link],
}

impl<'a> DagNode<'a> {
    pub fn directory(links: &'a [Link]) -> Self {
        Self {
            data: DIRECTORY_DATA,
            links,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
