//! Property tests for scope isolation.
//!
//! Random record distributions and membership changes must never let a
//! tenant actor see outside their company, a manager see outside their
//! current team, or a contributor see records they do not own.

mod common;

use common::SalesOrg;
use proptest::prelude::*;
use tenant_scope::model::{EntityKind, TeamId};
use tenant_scope::storage::Directory;
use tenant_scope::{Role, ScopeLevel};

#[derive(Debug, Clone)]
enum Membership {
    Unchanged,
    U2ToT2,
    U2Teamless,
    ManagerTeamless,
}

fn membership_strategy() -> impl Strategy<Value = Membership> {
    prop_oneof![
        Just(Membership::Unchanged),
        Just(Membership::U2ToT2),
        Just(Membership::U2Teamless),
        Just(Membership::ManagerTeamless),
    ]
}

prop_compose! {
    fn records_strategy()
        (records in prop::collection::vec((0usize..6, 0usize..4), 0..40))
        -> Vec<(usize, usize)> {
        records
    }
}

async fn build(records: &[(usize, usize)], membership: &Membership) -> SalesOrg {
    let org = SalesOrg::new().await;
    let owners = [&org.admin, &org.m, &org.u1, &org.u2, &org.u3, &org.x];
    for (owner, kind) in records {
        org.seed(EntityKind::OWNED[*kind], owners[*owner], 1).await;
    }

    let change: Option<(&tenant_scope::model::User, Option<TeamId>)> = match membership {
        Membership::Unchanged => None,
        Membership::U2ToT2 => Some((&org.u2, Some(org.t2.id))),
        Membership::U2Teamless => Some((&org.u2, None)),
        Membership::ManagerTeamless => Some((&org.m, None)),
    };
    if let Some((user, team)) = change {
        org.storage.move_user(&user.id, team).await.unwrap();
    }
    org
}

proptest! {
    #[test]
    fn test_scoped_queries_stay_inside_their_scope(
        records in records_strategy(),
        membership in membership_strategy(),
    ) {
        tokio_test::block_on(async {
            let org = build(&records, &membership).await;

            for actor in org.everyone() {
                let ctx = org.ctx(actor).await;
                for kind in EntityKind::OWNED {
                    let visible = org.visible(kind, actor).await;

                    if actor.role != Role::PlatformAdmin {
                        assert!(visible.iter().all(|r| Some(&r.company_id) == ctx.company_id()));
                    }
                    match ctx.scope_level() {
                        ScopeLevel::Owner => {
                            assert!(visible.iter().all(|r| r.owner_id == actor.id));
                        }
                        ScopeLevel::Team => {
                            let team_id = ctx.team_id().unwrap();
                            let members = org.storage.team_member_ids(team_id).await.unwrap();
                            assert!(visible.iter().all(|r| members.contains(&r.owner_id)));
                        }
                        ScopeLevel::Company | ScopeLevel::Platform => {}
                    }
                }
            }
        });
    }

    #[test]
    fn test_platform_admin_sees_every_record(records in records_strategy()) {
        tokio_test::block_on(async {
            let org = build(&records, &Membership::Unchanged).await;
            let mut seen = 0;
            for kind in EntityKind::OWNED {
                seen += org.visible(kind, &org.platform).await.len();
            }
            assert_eq!(seen, records.len());
        });
    }

    #[test]
    fn test_fallback_never_widens(records in records_strategy()) {
        tokio_test::block_on(async {
            let org = build(&records, &Membership::ManagerTeamless).await;
            let ctx = org.ctx(&org.m).await;
            assert!(ctx.is_fallback());

            let expected = records.iter().filter(|(owner, _)| *owner == 1).count();
            let mut seen = 0;
            for kind in EntityKind::OWNED {
                seen += org.visible(kind, &org.m).await.len();
            }
            assert_eq!(seen, expected);
        });
    }
}
