//! Ownership resolution across the exhibit hierarchy.
//!
//! Ownership is a flat `owner` column on every record. Which of those owners
//! controls an authorization decision is computed here, per call, from the
//! exhibit's owner, the child's owner and the acting user.

use std::time::Duration;

use tracing::{debug, warn};

use exhibits_core::{RecordId, RecordType, UserId};

use crate::AuthzError;
use crate::store::{OwnershipStore, bounded};

/// Precedence between an exhibit's owner and a child record's owner.
///
/// First match wins:
/// 1. both owners agree: that owner;
/// 2. the acting user owns the child: the child owner;
/// 3. the acting user owns the exhibit: the exhibit owner;
/// 4. otherwise nobody (`None`).
pub fn resolve_precedence(user_id: UserId, exhibit_owner: UserId, child_owner: UserId) -> Option<UserId> {
    if child_owner == exhibit_owner {
        Some(exhibit_owner)
    } else if child_owner == user_id {
        Some(child_owner)
    } else if user_id == exhibit_owner {
        Some(exhibit_owner)
    } else {
        None
    }
}

/// Determines the effective owner of a record for authorization.
pub struct OwnershipResolver<S> {
    store: S,
    lookup_timeout: Duration,
}

impl<S> OwnershipResolver<S>
where
    S: OwnershipStore,
{
    pub fn new(store: S, lookup_timeout: Duration) -> Self {
        Self {
            store,
            lookup_timeout,
        }
    }

    /// Effective owner, or `None` when no ownership relationship can be proven.
    ///
    /// Lookup failures and timeouts are logged and reported as `None`.
    pub async fn resolve_owner(
        &self,
        user_id: UserId,
        parent_id: Option<RecordId>,
        child_id: Option<RecordId>,
        record_type: RecordType,
    ) -> Option<UserId> {
        match self
            .try_resolve_owner(user_id, parent_id, child_id, record_type)
            .await
        {
            Ok(owner) => owner,
            Err(e) => {
                warn!(%record_type, error = %e, "ownership lookup failed; treating as unowned");
                None
            }
        }
    }

    /// Like [`Self::resolve_owner`] but keeps lookup failures distinct from
    /// "no owner".
    pub async fn try_resolve_owner(
        &self,
        user_id: UserId,
        parent_id: Option<RecordId>,
        child_id: Option<RecordId>,
        record_type: RecordType,
    ) -> Result<Option<UserId>, AuthzError> {
        let Some(exhibit_id) = parent_id else {
            debug!(%record_type, "no parent exhibit supplied");
            return Ok(None);
        };

        // Exhibits, and children that do not exist yet, authorize against the
        // exhibit alone.
        let child_id = match child_id {
            Some(id) if record_type.is_child() => id,
            _ => return self.exhibit_owner(exhibit_id).await,
        };

        let (exhibit_owner, child_owner) = tokio::join!(
            bounded(
                self.lookup_timeout,
                "exhibit_owner",
                self.store.exhibit_owner(exhibit_id),
            ),
            bounded(
                self.lookup_timeout,
                "record_owner",
                self.store.record_owner(record_type, exhibit_id, child_id),
            ),
        );

        let Some(exhibit_owner) = exhibit_owner? else {
            debug!(%exhibit_id, "exhibit not found");
            return Ok(None);
        };
        let Some(exhibit_owner) = UserId::from_raw(exhibit_owner) else {
            warn!(%exhibit_id, raw = exhibit_owner, "exhibit has a malformed owner");
            return Ok(None);
        };

        match child_owner? {
            None => Ok(Some(exhibit_owner)),
            Some(raw) => match UserId::from_raw(raw) {
                Some(child_owner) => Ok(resolve_precedence(user_id, exhibit_owner, child_owner)),
                None => {
                    warn!(%record_type, %child_id, raw, "record has a malformed owner");
                    Ok(None)
                }
            },
        }
    }

    async fn exhibit_owner(&self, exhibit_id: RecordId) -> Result<Option<UserId>, AuthzError> {
        let raw = bounded(
            self.lookup_timeout,
            "exhibit_owner",
            self.store.exhibit_owner(exhibit_id),
        )
        .await?;

        Ok(match raw {
            Some(raw) => {
                let owner = UserId::from_raw(raw);
                if owner.is_none() {
                    warn!(%exhibit_id, raw, "exhibit has a malformed owner");
                }
                owner
            }
            None => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use std::time::Instant;

    use proptest::prelude::*;

    use super::*;
    use crate::test_support::FixtureStore;

    fn uid(raw: i64) -> UserId {
        UserId::from_raw(raw).unwrap()
    }

    fn resolver(store: FixtureStore) -> (Arc<FixtureStore>, OwnershipResolver<Arc<FixtureStore>>) {
        let store = Arc::new(store);
        let resolver = OwnershipResolver::new(store.clone(), Duration::from_millis(100));
        (store, resolver)
    }

    #[test]
    fn precedence_table() {
        // shared owner
        assert_eq!(resolve_precedence(uid(5), uid(5), uid(5)), Some(uid(5)));
        assert_eq!(resolve_precedence(uid(3), uid(5), uid(5)), Some(uid(5)));
        // user owns the leaf
        assert_eq!(resolve_precedence(uid(9), uid(7), uid(9)), Some(uid(9)));
        // user owns the exhibit
        assert_eq!(resolve_precedence(uid(7), uid(7), uid(9)), Some(uid(7)));
        // unrelated user
        assert_eq!(resolve_precedence(uid(3), uid(7), uid(9)), None);
    }

    #[tokio::test]
    async fn precedence_through_the_store() {
        let exhibit = RecordId::new();
        let shared = RecordId::new();
        let foreign = RecordId::new();
        let (_, resolver) = resolver(
            FixtureStore::new()
                .with_exhibit(exhibit, 7)
                .with_record(RecordType::Item, exhibit, shared, 7)
                .with_record(RecordType::Item, exhibit, foreign, 9),
        );

        let owner = |user: i64, child: RecordId| resolver.resolve_owner(uid(user), Some(exhibit), Some(child), RecordType::Item);

        assert_eq!(owner(3, shared).await, Some(uid(7)));
        assert_eq!(owner(9, foreign).await, Some(uid(9)));
        assert_eq!(owner(7, foreign).await, Some(uid(7)));
        assert_eq!(owner(3, foreign).await, None);
    }

    #[tokio::test]
    async fn all_owners_equal_returns_that_owner() {
        let exhibit = RecordId::new();
        let heading = RecordId::new();
        let (_, resolver) = resolver(
            FixtureStore::new()
                .with_exhibit(exhibit, 5)
                .with_record(RecordType::Heading, exhibit, heading, 5),
        );

        let owner = resolver
            .resolve_owner(uid(5), Some(exhibit), Some(heading), RecordType::Heading)
            .await;
        assert_eq!(owner, Some(uid(5)));
    }

    #[tokio::test]
    async fn missing_child_id_falls_back_to_exhibit() {
        let exhibit = RecordId::new();
        let (_, resolver) = resolver(FixtureStore::new().with_exhibit(exhibit, 7));

        let as_item = resolver
            .resolve_owner(uid(3), Some(exhibit), None, RecordType::Item)
            .await;
        let as_exhibit = resolver
            .resolve_owner(uid(3), Some(exhibit), None, RecordType::Exhibit)
            .await;

        assert_eq!(as_item, Some(uid(7)));
        assert_eq!(as_item, as_exhibit);
    }

    #[tokio::test]
    async fn exhibit_branch_ignores_child_id() {
        let exhibit = RecordId::new();
        let (store, resolver) = resolver(FixtureStore::new().with_exhibit(exhibit, 7));

        let owner = resolver
            .resolve_owner(uid(3), Some(exhibit), Some(RecordId::new()), RecordType::Exhibit)
            .await;

        assert_eq!(owner, Some(uid(7)));
        assert_eq!(store.ownership_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_child_inherits_exhibit_owner() {
        let exhibit = RecordId::new();
        let (store, resolver) = resolver(FixtureStore::new().with_exhibit(exhibit, 7));

        let owner = resolver
            .resolve_owner(uid(3), Some(exhibit), Some(RecordId::new()), RecordType::GridItem)
            .await;

        assert_eq!(owner, Some(uid(7)));
        // exhibit and child are both looked up
        assert_eq!(store.ownership_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn child_of_another_exhibit_is_not_found_here() {
        let mine = RecordId::new();
        let theirs = RecordId::new();
        let item = RecordId::new();
        let (_, resolver) = resolver(
            FixtureStore::new()
                .with_exhibit(mine, 7)
                .with_exhibit(theirs, 9)
                .with_record(RecordType::Item, theirs, item, 9),
        );

        let owner = resolver
            .resolve_owner(uid(7), Some(mine), Some(item), RecordType::Item)
            .await;
        assert_eq!(owner, Some(uid(7)));

        let owner = resolver
            .resolve_owner(uid(7), Some(theirs), Some(item), RecordType::Item)
            .await;
        assert_eq!(owner, Some(uid(9)));
    }

    #[tokio::test]
    async fn missing_exhibit_or_parent_resolves_to_nobody() {
        let (store, resolver) = resolver(FixtureStore::new());

        let owner = resolver
            .resolve_owner(uid(3), Some(RecordId::new()), Some(RecordId::new()), RecordType::Timeline)
            .await;
        assert_eq!(owner, None);

        let before = store.ownership_calls.load(Ordering::SeqCst);
        let owner = resolver.resolve_owner(uid(3), None, None, RecordType::Exhibit).await;
        assert_eq!(owner, None);
        assert_eq!(store.ownership_calls.load(Ordering::SeqCst), before);
    }

    #[tokio::test]
    async fn malformed_owners_are_never_coerced() {
        let zero = RecordId::new();
        let fine = RecordId::new();
        let broken_child = RecordId::new();
        let (_, resolver) = resolver(
            FixtureStore::new()
                .with_exhibit(zero, 0)
                .with_exhibit(fine, 7)
                .with_record(RecordType::TimelineItem, fine, broken_child, -1),
        );

        assert_eq!(
            resolver.resolve_owner(uid(7), Some(zero), None, RecordType::Exhibit).await,
            None
        );
        assert_eq!(
            resolver
                .resolve_owner(uid(7), Some(fine), Some(broken_child), RecordType::TimelineItem)
                .await,
            None
        );
    }

    #[tokio::test]
    async fn lookup_errors_become_nobody_at_the_boundary() {
        let exhibit = RecordId::new();
        let (_, resolver) = resolver(FixtureStore::new().with_exhibit(exhibit, 7).failing_ownership());

        let err = resolver
            .try_resolve_owner(uid(7), Some(exhibit), None, RecordType::Exhibit)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::Lookup(_)));

        let owner = resolver
            .resolve_owner(uid(7), Some(exhibit), Some(RecordId::new()), RecordType::Item)
            .await;
        assert_eq!(owner, None);
    }

    #[tokio::test]
    async fn exhibit_and_child_lookups_overlap() {
        let delay = Duration::from_millis(100);
        let exhibit = RecordId::new();
        let item = RecordId::new();
        let store = Arc::new(
            FixtureStore::new()
                .with_exhibit(exhibit, 7)
                .with_record(RecordType::Item, exhibit, item, 9)
                .slow_ownership(delay),
        );
        let resolver = OwnershipResolver::new(store.clone(), Duration::from_millis(500));

        let started = Instant::now();
        let owner = resolver
            .try_resolve_owner(uid(9), Some(exhibit), Some(item), RecordType::Item)
            .await
            .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(owner, Some(uid(9)));
        assert_eq!(store.ownership_calls.load(Ordering::SeqCst), 2);
        assert!(elapsed < delay * 2, "lookups ran back to back: {elapsed:?}");
    }

    #[tokio::test]
    async fn slow_lookups_time_out() {
        let exhibit = RecordId::new();
        let (_, resolver) = resolver(
            FixtureStore::new()
                .with_exhibit(exhibit, 7)
                .slow_ownership(Duration::from_millis(500)),
        );

        let err = resolver
            .try_resolve_owner(uid(7), Some(exhibit), None, RecordType::Exhibit)
            .await
            .unwrap_err();
        assert_eq!(err, AuthzError::Timeout("exhibit_owner"));
    }

    proptest! {
        #[test]
        fn resolved_owner_is_always_related(user in 1i64..6, exhibit in 1i64..6, child in 1i64..6) {
            let resolved = resolve_precedence(uid(user), uid(exhibit), uid(child));
            match resolved {
                Some(owner) => {
                    prop_assert!(owner == uid(exhibit) || owner == uid(child));
                    prop_assert!(exhibit == child || owner == uid(user));
                }
                None => {
                    prop_assert!(exhibit != child && user != exhibit && user != child);
                }
            }
        }
    }
}
