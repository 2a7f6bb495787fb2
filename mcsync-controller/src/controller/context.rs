use kube::Client;
use kube::runtime::reflector::Store;
use std::sync::Arc;

use mcsync_common::config::ControllerConfig;
use mcsync_common::state::State;

use crate::controller::{protection::check_deletion_allowed, types::NamespacedName};
use crate::crd::v1alpha1::subscription::Subscription;
use crate::error::Result;

// Context struct to hold the kube client, the subscription cache and the state
#[derive(Clone)]
pub struct Context {
    pub client: Client,
    pub subscriptions: Store<Subscription>,
    pub state: Option<Arc<State>>,
}

impl Context {
    pub fn new(client: Client, subscriptions: Store<Subscription>) -> Self {
        Self { client, subscriptions, state: None }
    }

    pub fn with_state(mut self, state: Arc<State>) -> Self {
        self.state = Some(state);
        self
    }

    pub fn config(&self) -> ControllerConfig {
        self.state
            .as_ref()
            .map(|state| state.config.controller.clone())
            .unwrap_or_default()
    }

    /// Run the deletion guard against the cached subscriptions
    pub fn check_deletion_allowed(&self, subscription: &NamespacedName, cluster: &NamespacedName) -> Result<()> {
        check_deletion_allowed(&self.subscriptions, subscription, cluster)?;
        Ok(())
    }
}
