// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Absolute node path helpers
//!
//! Paths are `/`-separated, absolute, and never end with a slash except
//! for the root path itself.

use crate::node::types::NodeError;

/// The root path
pub const ROOT: &str = "/";

/// Validate an absolute path
pub fn validate(path: &str) -> Result<(), NodeError> {
    if !path.starts_with('/') {
        return Err(NodeError::InvalidPath(format!(
            "{} (paths must be absolute)",
            path
        )));
    }
    if path == ROOT {
        return Ok(());
    }
    if path.ends_with('/') {
        return Err(NodeError::InvalidPath(format!(
            "{} (trailing slash)",
            path
        )));
    }
    if path[1..].split('/').any(|segment| segment.is_empty()) {
        return Err(NodeError::InvalidPath(format!(
            "{} (empty path segment)",
            path
        )));
    }
    Ok(())
}

/// Normalize a user supplied path: collapse duplicate slashes, drop `.`
/// segments, resolve `..` and strip a trailing slash
pub fn normalize(path: &str) -> Result<String, NodeError> {
    if !path.starts_with('/') {
        return Err(NodeError::InvalidPath(format!(
            "{} (paths must be absolute)",
            path
        )));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(NodeError::InvalidPath(format!(
                        "{} (escapes the root)",
                        path
                    )));
                }
            }
            other => segments.push(other),
        }
    }

    Ok(format!("/{}", segments.join("/")))
}

/// Parent path, `None` for the root
pub fn parent(path: &str) -> Option<&str> {
    if path == ROOT {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some(ROOT),
        Some(index) => Some(&path[..index]),
        None => None,
    }
}

/// Last path segment, empty for the root
pub fn name(path: &str) -> &str {
    match path.rfind('/') {
        Some(index) => &path[index + 1..],
        None => path,
    }
}

/// Append a child name to a path
pub fn join(parent: &str, child: &str) -> String {
    if parent == ROOT {
        format!("/{}", child)
    } else {
        format!("{}/{}", parent, child)
    }
}

/// Number of segments below the root
pub fn depth(path: &str) -> usize {
    if path == ROOT {
        0
    } else {
        path.matches('/').count()
    }
}

/// Check if `path` is a direct child of `ancestor`
pub fn is_child_of(path: &str, ancestor: &str) -> bool {
    parent(path) == Some(ancestor)
}

/// Check if `path` lies strictly below `ancestor`
pub fn is_descendant_of(path: &str, ancestor: &str) -> bool {
    if path == ancestor {
        return false;
    }
    if ancestor == ROOT {
        return path.starts_with('/');
    }
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}
