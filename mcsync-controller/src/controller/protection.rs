// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use mcsync_common::telemetry::{debug, info};

use crate::controller::{lookup::SubscriptionLookup, types::NamespacedName};
use crate::error::DeletionError;

/// Decide whether a resource generated for `subscription` may be removed from
/// `cluster`
///
/// Deletion is allowed when the subscription no longer exists, is itself being
/// deleted, or no longer binds `cluster`. Otherwise the subscription still owns
/// the resource and the deletion is refused with [`DeletionError::Blocked`].
///
/// # Arguments
/// * `lookup` - Subscription store to read from
/// * `subscription` - The subscription believed to own the resource
/// * `cluster` - The managed cluster the resource lives in
///
/// # Returns
/// `Ok(())` if the deletion may proceed, `Blocked` if it must wait, or
/// `LookupFailed` carrying the store error
pub fn check_deletion_allowed<L>(
    lookup: &L,
    subscription: &NamespacedName,
    cluster: &NamespacedName,
) -> Result<(), DeletionError>
where
    L: SubscriptionLookup + ?Sized,
{
    let state = match lookup.get(subscription)? {
        Some(state) => state,
        None => {
            debug!(
                event = "DeletionAllowed",
                reason = "SubscriptionNotFound",
                subscription = %subscription,
                cluster = %cluster,
            );
            return Ok(());
        }
    };

    if state.deleting {
        debug!(
            event = "DeletionAllowed",
            reason = "SubscriptionDeleting",
            subscription = %subscription,
            cluster = %cluster,
        );
        return Ok(());
    }

    if !state.binds(cluster) {
        debug!(
            event = "DeletionAllowed",
            reason = "ClusterUnbound",
            subscription = %subscription,
            cluster = %cluster,
        );
        return Ok(());
    }

    info!(
        event = "DeletionBlocked",
        subscription = %subscription,
        cluster = %cluster,
    );
    Err(DeletionError::Blocked {
        subscription: subscription.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::lookup::{MockSubscriptionLookup, SubscriptionState};
    use crate::error::LookupError;
    use crate::test_support::{subscription, subscription_store};
    use kube::runtime::reflector::Store;
    use crate::crd::v1alpha1::subscription::Subscription;

    fn store() -> Store<Subscription> {
        subscription_store(vec![
            subscription("deleting-sub-ns", "deleting-sub", true, &["mcls1-ns/mcls1", "mcls2-ns/mcls2"]),
            subscription("unbound-sub-ns", "unbound-sub", false, &["mcls1-ns/mcls1"]),
            subscription("block-sub-ns", "block-sub", false, &["mcls1-ns/mcls1", "mcls2-ns/mcls2"]),
        ])
    }

    fn key(namespace: &str, name: &str) -> NamespacedName {
        NamespacedName::new(namespace, name)
    }

    #[test]
    fn allows_when_subscription_not_found() {
        let result = check_deletion_allowed(
            &store(),
            &key("non-existent-sub-ns", "non-existent-sub"),
            &key("mcls1-ns", "mcls1"),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn allows_when_subscription_is_deleting() {
        let result = check_deletion_allowed(
            &store(),
            &key("deleting-sub-ns", "deleting-sub"),
            &key("mcls1-ns", "mcls1"),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn allows_when_cluster_is_unbound() {
        let result = check_deletion_allowed(
            &store(),
            &key("unbound-sub-ns", "unbound-sub"),
            &key("mcls2-ns", "mcls2"),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn blocks_while_subscription_still_binds_cluster() {
        let err = check_deletion_allowed(
            &store(),
            &key("block-sub-ns", "block-sub"),
            &key("mcls2-ns", "mcls2"),
        )
        .unwrap_err();

        assert!(err.is_blocked());
        assert!(matches!(
            &err,
            DeletionError::Blocked { subscription } if *subscription == key("block-sub-ns", "block-sub")
        ));
        assert_eq!(
            err.to_string(),
            "block deleting current resource until subscription block-sub-ns/block-sub get deleted or unbind from subscription"
        );
    }

    #[test]
    fn binding_match_is_exact() {
        let result = check_deletion_allowed(
            &store(),
            &key("block-sub-ns", "block-sub"),
            &key("mcls2-ns", "mcls"),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn lookup_failure_propagates_unchanged() {
        let mut lookup = MockSubscriptionLookup::new();
        lookup
            .expect_get()
            .times(1)
            .returning(|_| Err(LookupError::Unavailable("cache not synced".to_string())));

        let err = check_deletion_allowed(&lookup, &key("block-sub-ns", "block-sub"), &key("mcls2-ns", "mcls2"))
            .unwrap_err();

        assert!(!err.is_blocked());
        assert!(matches!(err, DeletionError::LookupFailed(LookupError::Unavailable(_))));
        assert_eq!(err.to_string(), "subscription store unavailable: cache not synced");
    }

    #[test]
    fn reads_the_store_exactly_once() {
        let mut lookup = MockSubscriptionLookup::new();
        lookup
            .expect_get()
            .withf(|k| *k == NamespacedName::new("block-sub-ns", "block-sub"))
            .times(1)
            .returning(|k| Ok(Some(SubscriptionState {
                name: k.clone(),
                deleting: false,
                binding_clusters: vec!["mcls2-ns/mcls2".to_string()],
            })));

        let err = check_deletion_allowed(&lookup, &key("block-sub-ns", "block-sub"), &key("mcls2-ns", "mcls2"))
            .unwrap_err();
        assert!(err.is_blocked());
    }

    #[test]
    fn works_through_a_trait_object() {
        let lookup: Box<dyn SubscriptionLookup> = Box::new(store());
        let result = check_deletion_allowed(
            lookup.as_ref(),
            &key("block-sub-ns", "block-sub"),
            &key("mcls1-ns", "mcls1"),
        );
        assert!(result.unwrap_err().is_blocked());
    }
}
