// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use kube::CustomResource;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use std::fmt::{Display, Formatter, Result as FmtResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[kube(
    kind = "Subscription",
    group = "apps.clusternet.io",
    version = "v1alpha1",
    status = "SubscriptionStatus",
    shortname = "sub",
    doc = "Subscription binds a set of feeds to the clusters matched by its subscribers.",
    derive = "PartialEq",
    printcolumn = r#"{"name":"Strategy", "type":"string", "description":"Scheduling strategy", "jsonPath":".spec.schedulingStrategy"}"#,
    printcolumn = r#"{"name":"Desired", "type":"integer", "description":"Desired releases", "jsonPath":".status.desiredReleases"}"#,
    printcolumn = r#"{"name":"Completed", "type":"integer", "description":"Completed releases", "jsonPath":".status.completedReleases"}"#,
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSpec {
    /// Clusters that should receive the feeds
    pub subscribers: Vec<Subscriber>,
    /// Resources to distribute
    pub feeds: Vec<Feed>,
    #[serde(default)]
    /// How feeds are spread across matched clusters
    pub scheduling_strategy: SchedulingStrategy,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    /// Label selector over managed clusters
    pub cluster_affinity: LabelSelector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Relative share when dividing replicas
    pub weight: Option<i32>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    pub api_version: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub name: String,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, JsonSchema)]
pub enum SchedulingStrategy {
    #[default]
    Replication,
    Dividing,
}

impl Display for SchedulingStrategy {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            SchedulingStrategy::Replication => write!(f, "Replication"),
            SchedulingStrategy::Dividing => write!(f, "Dividing"),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    #[serde(default)]
    /// Managed clusters currently bound, as `namespace/name`
    pub binding_clusters: Vec<String>,
    #[serde(default)]
    /// Number of releases that should exist
    pub desired_releases: i32,
    #[serde(default)]
    /// Number of releases applied successfully
    pub completed_releases: i32,
}
