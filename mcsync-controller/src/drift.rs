// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

//! Structural drift detection between a desired manifest and a live object.
//!
//! Both trees are walked in lock-step. Every subtree root that differs is
//! classified as added (only in `new`), removed (only in `old`) or changed
//! (present in both with a different value or node kind). Descendants of an
//! added or removed subtree are not classified individually.
//!
//! In the usual controller call `old` is the desired manifest and `new` is the
//! object read back from the remote cluster, so "added" fields are the ones
//! the remote control plane filled in (assigned IPs, generated names, ...).
//! Additions can be ignored through [`ResyncPolicy::ignore_additions`].
//! Removals and changes always force a resync: a field dropped from the
//! desired state has to reach the cluster, so there is no switch for them.

use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::ops::ControlFlow;

use mcsync_common::config::ControllerConfig;
use mcsync_common::telemetry::debug;

use crate::document::Document;
use crate::error::Result;

/// Top-level key owned by the remote control plane
pub static STATUS_KEY: &str = "status";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResyncPolicy {
    /// Exclude the top-level status section from both trees
    pub ignore_status: bool,
    /// Do not count fields present only in `new`
    pub ignore_additions: bool,
}

impl ResyncPolicy {
    pub fn ignoring_additions(ignore_additions: bool) -> Self {
        ResyncPolicy {
            ignore_additions,
            ..Default::default()
        }
    }
}

impl Default for ResyncPolicy {
    fn default() -> Self {
        ResyncPolicy {
            ignore_status: true,
            ignore_additions: false,
        }
    }
}

impl From<&ControllerConfig> for ResyncPolicy {
    fn from(config: &ControllerConfig) -> Self {
        ResyncPolicy::ignoring_additions(config.ignore_additions)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a node relative to the document root, rendered as
/// `.spec.ports[1].port`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        if self.0.is_empty() {
            return write!(f, ".");
        }
        for segment in &self.0 {
            match segment {
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiffKind {
    Added,
    Removed,
    Changed,
}

impl Display for DiffKind {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            DiffKind::Added => write!(f, "added"),
            DiffKind::Removed => write!(f, "removed"),
            DiffKind::Changed => write!(f, "changed"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDiff {
    pub path: FieldPath,
    pub kind: DiffKind,
}

impl FieldDiff {
    fn new(path: &[PathSegment], kind: DiffKind) -> Self {
        FieldDiff {
            path: FieldPath(path.to_vec()),
            kind,
        }
    }

    /// Whether this difference counts toward a resync under `policy`
    pub fn is_significant(&self, policy: &ResyncPolicy) -> bool {
        !(self.kind == DiffKind::Added && policy.ignore_additions)
    }
}

impl Display for FieldDiff {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{} {}", self.kind, self.path)
    }
}

/// Decide whether `new` has diverged from `old` enough to push `old` again
///
/// # Arguments
/// * `old` - The desired manifest
/// * `new` - The observed object
/// * `policy` - Which differences to disregard
///
/// # Returns
/// `true` if any path is removed or changed, or added while additions count
pub fn needs_resync(old: &Document, new: &Document, policy: &ResyncPolicy) -> bool {
    let mut found = None;
    let _ = walk(old, new, &mut Vec::new(), policy, &mut |diff| {
        if diff.is_significant(policy) {
            found = Some(diff);
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });

    match found {
        Some(diff) => {
            debug!(
                event = "ResyncRequired",
                path = %diff.path,
                change = %diff.kind,
            );
            true
        }
        None => false,
    }
}

/// Classify every differing subtree of `old` and `new`
///
/// Additions are reported even when `policy` ignores them; use
/// [`FieldDiff::is_significant`] to filter.
pub fn diff(old: &Document, new: &Document, policy: &ResyncPolicy) -> Vec<FieldDiff> {
    let mut diffs = Vec::new();
    let _ = walk(old, new, &mut Vec::new(), policy, &mut |diff| {
        diffs.push(diff);
        ControlFlow::<()>::Continue(())
    });
    diffs
}

/// Compare a desired resource with the live copy read from a cluster
///
/// Both sides are serialized to documents first, so the desired side may be a
/// typed object and the live side a `DynamicObject`.
pub fn resource_needs_resync<D, L>(desired: &D, live: &L, policy: &ResyncPolicy) -> Result<bool>
where
    D: Serialize,
    L: Serialize,
{
    let desired = Document::from_serializable(desired)?;
    let live = Document::from_serializable(live)?;

    Ok(needs_resync(&desired, &live, policy))
}

fn walk<F>(
    old: &Document,
    new: &Document,
    path: &mut Vec<PathSegment>,
    policy: &ResyncPolicy,
    visit: &mut F,
) -> ControlFlow<()>
where
    F: FnMut(FieldDiff) -> ControlFlow<()>,
{
    match (old, new) {
        (Document::Map(old_map), Document::Map(new_map)) => {
            let at_root = path.is_empty();
            let skip = |key: &str| at_root && policy.ignore_status && key == STATUS_KEY;

            let removed_or_common: Vec<(&String, &Document)> = old_map
                .iter()
                .filter(|(key, _)| !skip(key))
                .collect();
            let added: Vec<&String> = new_map
                .keys()
                .filter(|key| !skip(key) && !old_map.contains_key(*key))
                .collect();

            for (key, old_value) in removed_or_common {
                path.push(PathSegment::Key(key.clone()));
                let flow = match new_map.get(key) {
                    Some(new_value) => walk(old_value, new_value, path, policy, visit),
                    None => visit(FieldDiff::new(path, DiffKind::Removed)),
                };
                path.pop();
                if flow.is_break() {
                    return flow;
                }
            }

            for key in added {
                path.push(PathSegment::Key(key.clone()));
                let flow = visit(FieldDiff::new(path, DiffKind::Added));
                path.pop();
                if flow.is_break() {
                    return flow;
                }
            }

            ControlFlow::Continue(())
        }
        (Document::Sequence(old_items), Document::Sequence(new_items)) => {
            for index in 0..old_items.len().max(new_items.len()) {
                path.push(PathSegment::Index(index));
                let flow = match (old_items.get(index), new_items.get(index)) {
                    (Some(old_item), Some(new_item)) => walk(old_item, new_item, path, policy, visit),
                    (Some(_), None) => visit(FieldDiff::new(path, DiffKind::Removed)),
                    (None, Some(_)) => visit(FieldDiff::new(path, DiffKind::Added)),
                    (None, None) => ControlFlow::Continue(()),
                };
                path.pop();
                if flow.is_break() {
                    return flow;
                }
            }

            ControlFlow::Continue(())
        }
        (Document::Scalar(old_value), Document::Scalar(new_value)) if old_value == new_value => {
            ControlFlow::Continue(())
        }
        // Differing scalars or mismatched node kinds
        _ => visit(FieldDiff::new(path, DiffKind::Changed)),
    }
}
