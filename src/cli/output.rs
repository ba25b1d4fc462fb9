//! CLI output: error mapping from domain errors to the stable CLI surface.

use crate::error::ApiError;

/// Map domain errors to the line printed on stderr before exiting.
pub fn map_error(e: &ApiError) -> String {
    format!("error: {}", e)
}
