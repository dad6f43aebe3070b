//! End-to-end team reassignment.

mod common;

use common::SalesOrg;
use tenant_scope::model::EntityKind;
use tenant_scope::{ErrorKind, ReassignmentRequest, ScopeError};

#[tokio::test]
async fn test_manager_moves_member_to_sibling_team() {
    let org = SalesOrg::new().await;
    org.seed(EntityKind::Deal, &org.u1, 3).await;
    org.seed(EntityKind::Contact, &org.u1, 5).await;
    let ctx = org.ctx(&org.m).await;

    let preview = org.service.preview_reassignment(&ctx, &org.u1.id).await.unwrap();
    assert_eq!(preview.deals_count(), 3);
    assert_eq!(preview.contacts_count(), 5);
    assert_eq!(preview.activities_count(), 0);
    assert_eq!(preview.total_records(), 8);

    let request = ReassignmentRequest::new(org.u1.id, org.t2.id)
        .with_transfer_to(org.u3.id)
        .with_expected_impact(preview);
    let outcome = org.service.apply_reassignment(&ctx, &request).await.unwrap();
    assert_eq!(outcome.records_transferred.total_records(), 8);

    let deals = org.storage.records(EntityKind::Deal).await;
    assert!(deals.iter().all(|r| r.owner_id == org.u3.id));
    assert_eq!(org.owned_by(EntityKind::Contact, &org.u3).await, 5);

    // M is still scoped to T1 and no longer sees any of it.
    assert!(org.visible(EntityKind::Deal, &org.m).await.is_empty());
    assert!(org.visible(EntityKind::Contact, &org.m).await.is_empty());
    assert_eq!(org.visible(EntityKind::Deal, &org.u3).await.len(), 3);
}

#[tokio::test]
async fn test_failed_transfer_leaves_no_trace() {
    let org = SalesOrg::new().await;
    org.seed(EntityKind::Deal, &org.u1, 3).await;
    org.seed(EntityKind::Contact, &org.u1, 5).await;
    let ctx = org.ctx(&org.m).await;

    org.storage.fail_next_transfer();
    let request = ReassignmentRequest::new(org.u1.id, org.t2.id).with_transfer_to(org.u3.id);
    let err = org.service.apply_reassignment(&ctx, &request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert!(err.is_retryable());

    let u1 = org.ctx(&org.u1).await;
    assert_eq!(u1.team_id(), Some(&org.t1.id));
    assert_eq!(org.owned_by(EntityKind::Deal, &org.u1).await, 3);
    assert_eq!(org.owned_by(EntityKind::Contact, &org.u1).await, 5);
    assert_eq!(org.owned_by(EntityKind::Deal, &org.u3).await, 0);
}

#[tokio::test]
async fn test_apply_transfers_exactly_the_previewed_counts() {
    let org = SalesOrg::new().await;
    org.seed(EntityKind::Deal, &org.u1, 2).await;
    let ctx = org.ctx(&org.admin).await;

    let preview = org.service.preview_reassignment(&ctx, &org.u1.id).await.unwrap();

    // Someone hands U1 a deal between preview and apply.
    let stray = org.storage.records(EntityKind::Deal).await;
    org.seed(EntityKind::Deal, &org.u2, 1).await;
    let handed = org
        .storage
        .records(EntityKind::Deal)
        .await
        .into_iter()
        .find(|r| !stray.iter().any(|s| s.id == r.id))
        .unwrap();
    org.storage
        .set_record_owner(EntityKind::Deal, &handed.id, org.u1.id)
        .await
        .unwrap();

    let stale = ReassignmentRequest::new(org.u1.id, org.t2.id)
        .with_transfer_to(org.u3.id)
        .with_expected_impact(preview);
    let err = org.service.apply_reassignment(&ctx, &stale).await.unwrap_err();
    assert!(matches!(err, ScopeError::PreviewStale { expected: 2, actual: 3, .. }));
    assert_eq!(org.owned_by(EntityKind::Deal, &org.u1).await, 3);

    // A fresh preview goes through and moves what it reported.
    let fresh = org.service.preview_reassignment(&ctx, &org.u1.id).await.unwrap();
    let request = ReassignmentRequest::new(org.u1.id, org.t2.id)
        .with_transfer_to(org.u3.id)
        .with_expected_impact(fresh.clone());
    let outcome = org.service.apply_reassignment(&ctx, &request).await.unwrap();
    assert!(outcome.records_transferred.agrees_with(&fresh));
    assert_eq!(org.owned_by(EntityKind::Deal, &org.u3).await, 3);
}

#[tokio::test]
async fn test_cross_company_destination_never_mutates() {
    let org = SalesOrg::new().await;
    org.seed(EntityKind::Deal, &org.u1, 1).await;

    for actor in [&org.admin, &org.platform, &org.m] {
        let ctx = org.ctx(actor).await;
        let request = ReassignmentRequest::new(org.u1.id, org.t9.id).with_transfer_to(org.x.id);
        let err = org.service.apply_reassignment(&ctx, &request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDestination);
    }

    assert_eq!(org.ctx(&org.u1).await.team_id(), Some(&org.t1.id));
    assert_eq!(org.owned_by(EntityKind::Deal, &org.u1).await, 1);
    assert_eq!(org.owned_by(EntityKind::Deal, &org.x).await, 0);
}

#[tokio::test]
async fn test_concurrent_applies_serialise() {
    let org = SalesOrg::new().await;
    org.seed(EntityKind::Deal, &org.u1, 4).await;
    let ctx = org.ctx(&org.admin).await;

    let to_t2 = ReassignmentRequest::new(org.u1.id, org.t2.id).with_transfer_to(org.u3.id);
    let to_t1 = ReassignmentRequest::new(org.u1.id, org.t1.id);
    let (first, second) = futures::join!(
        org.service.apply_reassignment(&ctx, &to_t2),
        org.service.apply_reassignment(&ctx, &to_t1),
    );

    // However they interleave, no deal is left half-moved.
    assert!(first.is_ok() || second.is_ok());
    let owners: Vec<_> = org
        .storage
        .records(EntityKind::Deal)
        .await
        .into_iter()
        .map(|r| r.owner_id)
        .collect();
    assert!(owners.iter().all(|o| *o == owners[0]));
}
