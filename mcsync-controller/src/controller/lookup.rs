// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

//! Read access to subscriptions for the deletion guard.
//!
//! The production implementation reads from a reflector [`Store`], a local
//! cache that a watcher keeps up to date out of band. A caller can therefore
//! observe a binding list that is older than the latest scheduler update and
//! permit or block a deletion one reconcile pass too early or too late. The
//! next pass sees the refreshed bindings and corrects the decision.

use kube::runtime::reflector::{ObjectRef, Store};
use kube::ResourceExt;
use std::collections::BTreeMap;

#[cfg(test)]
use mockall::automock;

use crate::controller::types::NamespacedName;
use crate::crd::v1alpha1::subscription::Subscription;
use crate::error::LookupError;

/// What the deletion guard needs to know about a subscription
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionState {
    pub name: NamespacedName,
    /// Set once the subscription carries a deletion timestamp
    pub deleting: bool,
    /// Bound clusters as `namespace/name`
    pub binding_clusters: Vec<String>,
}

impl SubscriptionState {
    /// Whether `cluster` is still in the binding list
    pub fn binds(&self, cluster: &NamespacedName) -> bool {
        let cluster = cluster.to_string();
        self.binding_clusters.iter().any(|bound| *bound == cluster)
    }
}

impl TryFrom<&Subscription> for SubscriptionState {
    type Error = LookupError;

    fn try_from(subscription: &Subscription) -> Result<Self, Self::Error> {
        let name = subscription.metadata.name.clone().unwrap_or_default();
        let namespace = subscription.namespace().unwrap_or_default();
        let key = NamespacedName { namespace, name };

        if key.name.is_empty() {
            return Err(LookupError::Malformed(key, "metadata.name is not set"));
        }
        if key.namespace.is_empty() {
            return Err(LookupError::Malformed(key, "metadata.namespace is not set"));
        }

        Ok(SubscriptionState {
            name: key,
            deleting: subscription.metadata.deletion_timestamp.is_some(),
            binding_clusters: subscription
                .status
                .as_ref()
                .map(|status| status.binding_clusters.clone())
                .unwrap_or_default(),
        })
    }
}

// Read-only access to subscriptions by namespace and name
#[cfg_attr(test, automock)]
pub trait SubscriptionLookup: Send + Sync {
    /// Fetch a subscription, returning `Ok(None)` when it does not exist
    fn get(&self, key: &NamespacedName) -> Result<Option<SubscriptionState>, LookupError>;
}

impl SubscriptionLookup for Store<Subscription> {
    fn get(&self, key: &NamespacedName) -> Result<Option<SubscriptionState>, LookupError> {
        Store::get(self, &ObjectRef::new(&key.name).within(&key.namespace))
            .map(|subscription| SubscriptionState::try_from(subscription.as_ref()))
            .transpose()
    }
}

impl SubscriptionLookup for BTreeMap<NamespacedName, SubscriptionState> {
    fn get(&self, key: &NamespacedName) -> Result<Option<SubscriptionState>, LookupError> {
        Ok(BTreeMap::get(self, key).cloned())
    }
}
