// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use std::result;
use thiserror::Error;

use crate::controller::types::NamespacedName;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("kube error: {0}")]
    KubeError(#[from] kube::Error),
    #[error("missing object key: {0}")]
    MissingObjectKeyError(&'static str),
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("invalid object reference `{0}`, expected namespace/name")]
    InvalidReferenceError(String),
    #[error("failed to render CRD: {0}")]
    CrdRenderError(String),
    #[error("subscription cache did not sync within {0}s")]
    CacheSyncTimeoutError(u64),
    #[error(transparent)]
    DeletionError(#[from] DeletionError),
}

impl ControllerError {
    /// Whether the error is a policy decision rather than a failure
    pub fn is_deletion_blocked(&self) -> bool {
        matches!(self, ControllerError::DeletionError(e) if e.is_blocked())
    }
}

/// Failure to read from a subscription store
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("subscription store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed subscription record {0}: {1}")]
    Malformed(NamespacedName, &'static str),
}

/// Outcome of a refused deletion check
///
/// `Blocked` is an expected "not yet" answer and should be retried on the next
/// reconcile pass. `LookupFailed` carries the store error unchanged and goes
/// through the caller's normal backoff.
#[derive(Error, Debug)]
pub enum DeletionError {
    #[error("block deleting current resource until subscription {subscription} get deleted or unbind from subscription")]
    Blocked { subscription: NamespacedName },
    #[error(transparent)]
    LookupFailed(#[from] LookupError),
}

impl DeletionError {
    pub fn is_blocked(&self) -> bool {
        matches!(self, DeletionError::Blocked { .. })
    }
}

pub type Result<T> = result::Result<T, ControllerError>;
