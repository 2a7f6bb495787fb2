// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use kube::runtime::reflector::{self, Store};
use kube::runtime::watcher;
use serde_json::json;

use crate::crd::v1alpha1::subscription::Subscription;

/// Build a Subscription as the API server would return it
pub fn subscription(namespace: &str, name: &str, deleting: bool, binding_clusters: &[&str]) -> Subscription {
    let mut metadata = json!({
        "name": name,
        "namespace": namespace,
    });
    if deleting {
        metadata["deletionTimestamp"] = json!("2025-01-01T00:00:00Z");
        metadata["finalizers"] = json!(["apps.clusternet.io/finalizer"]);
    }

    serde_json::from_value(json!({
        "apiVersion": "apps.clusternet.io/v1alpha1",
        "kind": "Subscription",
        "metadata": metadata,
        "spec": {
            "subscribers": [{"clusterAffinity": {"matchLabels": {"clusters.clusternet.io/cluster-id": "all"}}}],
            "feeds": [{"apiVersion": "v1", "kind": "Service", "namespace": "default", "name": "web"}],
        },
        "status": {
            "bindingClusters": binding_clusters,
        },
    }))
    .expect("valid subscription fixture")
}

/// A reflector store pre-filled as if the watcher had applied `subscriptions`
pub fn subscription_store(subscriptions: Vec<Subscription>) -> Store<Subscription> {
    let (reader, mut writer) = reflector::store();
    for subscription in subscriptions {
        writer.apply_watcher_event(&watcher::Event::Apply(subscription));
    }
    reader
}
