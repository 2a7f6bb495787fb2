use kube::{
    api::Api,
    runtime::{controller::Action, reflector, reflector::Store, watcher, WatchStreamExt},
    Client,
};
use futures::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

use mcsync_common::config::ControllerConfig;
use mcsync_common::telemetry::{error, info, warn};

use crate::controller::context::Context;
use crate::crd::v1alpha1::subscription::Subscription;
use crate::error::{ControllerError, Result};


/// Create a new kube client by inferring the kubeconfig from the environment
/// or the default service account
///
/// # Returns
/// A Result containing the kube Client or an error
pub async fn create_k8s_client() -> Result<Client> {
    Client::try_default().await.map_err(ControllerError::from)
}

/// Start watching Subscriptions across all namespaces into a local cache
///
/// # Arguments
/// * `client`: The kube client to watch with
///
/// # Returns
/// The cache reader and the handle of the task feeding it
pub fn start_subscription_cache(client: Client) -> (Store<Subscription>, JoinHandle<()>) {
    let api = Api::<Subscription>::all(client);
    let (reader, writer) = reflector::store();

    let stream = reflector(writer, watcher(api, watcher::Config::default()))
        .default_backoff()
        .applied_objects();

    let handle = tokio::spawn(async move {
        stream
            .for_each(|event| async move {
                if let Err(e) = event {
                    warn!(
                        event = "SubscriptionWatchError",
                        error = %e,
                    );
                }
            })
            .await
    });

    (reader, handle)
}

/// Wait until the subscription cache has completed its initial list
///
/// # Arguments
/// * `store`: The cache reader
/// * `timeout_secs`: How long to wait before giving up
pub async fn wait_for_subscription_cache(store: &Store<Subscription>, timeout_secs: u64) -> Result<()> {
    tokio::time::timeout(Duration::from_secs(timeout_secs), store.wait_until_ready())
        .await
        .map_err(|_| ControllerError::CacheSyncTimeoutError(timeout_secs))?
        .map_err(|_| ControllerError::CacheSyncTimeoutError(timeout_secs))
}

/// Error policy for reconcilers using this crate
///
/// A blocked deletion is an expected wait, so it is logged at info and retried
/// after the short blocked interval. Anything else is logged as an error and
/// requeued after the standard interval.
///
/// # Arguments
/// * `_object`: The object that caused the error
/// * `error`: The error that occurred
/// * `ctx`: The context of the controller
///
/// # Returns
/// An Action to requeue the object
pub fn error_policy<T>(_object: Arc<T>, error: &ControllerError, ctx: Arc<Context>) -> Action {
    requeue_action(error, &ctx.config())
}

/// Pick the requeue delay for a reconcile error
pub fn requeue_action(err: &ControllerError, config: &ControllerConfig) -> Action {
    if err.is_deletion_blocked() {
        info!(
            event = "DeletionPending",
            reason = %err,
        );
        Action::requeue(Duration::from_secs(config.blocked_requeue_secs))
    } else {
        error!(
            event = "Error",
            error = %err,
        );
        Action::requeue(Duration::from_secs(config.requeue_secs))
    }
}
