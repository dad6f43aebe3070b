//! Shared fixtures for the integration suites.
//!
//! [`SalesOrg`] builds the reference organisation used throughout:
//!
//! - company C1 with team T1 (manager M, members U1 and U2) and team T2
//!   (member U3), plus a company admin A
//! - company C2 with team T9 (member X)
//! - a platform admin P

#![allow(dead_code)]

use tenant_scope::model::{Company, EntityKind, OwnedRecord, RecordStamp, Team, User};
use tenant_scope::storage::{InMemoryStorage, RecordStore};
use tenant_scope::{
    DirectoryTenantResolver, EngineConfig, Role, ScopingEngine, TeamReassignmentService,
    TenantContext,
};

pub struct SalesOrg {
    pub storage: InMemoryStorage,
    pub engine: ScopingEngine<InMemoryStorage>,
    pub service: TeamReassignmentService<InMemoryStorage>,
    pub c1: Company,
    pub c2: Company,
    pub t1: Team,
    pub t2: Team,
    pub t9: Team,
    pub admin: User,
    pub m: User,
    pub u1: User,
    pub u2: User,
    pub u3: User,
    pub x: User,
    pub platform: User,
}

impl SalesOrg {
    pub async fn new() -> Self {
        Self::with_config(EngineConfig::default()).await
    }

    pub async fn with_config(config: EngineConfig) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let storage = InMemoryStorage::new();
        let c1 = storage.insert_company(Company::new("C1")).await;
        let c2 = storage.insert_company(Company::new("C2")).await;
        let t1 = storage.insert_team(Team::new(c1.id, "T1")).await;
        let t2 = storage.insert_team(Team::new(c1.id, "T2")).await;
        let t9 = storage.insert_team(Team::new(c2.id, "T9")).await;

        let admin = storage
            .insert_user(User::new(c1.id, Role::CompanyAdmin, "A"))
            .await;
        let m = storage
            .insert_user(User::new(c1.id, Role::TeamManager, "M").on_team(t1.id))
            .await;
        let u1 = storage
            .insert_user(User::new(c1.id, Role::Contributor, "U1").on_team(t1.id))
            .await;
        let u2 = storage
            .insert_user(User::new(c1.id, Role::Contributor, "U2").on_team(t1.id))
            .await;
        let u3 = storage
            .insert_user(User::new(c1.id, Role::Contributor, "U3").on_team(t2.id))
            .await;
        let x = storage
            .insert_user(User::new(c2.id, Role::Contributor, "X").on_team(t9.id))
            .await;
        let platform = storage.insert_user(User::platform_admin("P")).await;

        Self {
            engine: ScopingEngine::with_config(storage.clone(), config.clone()),
            service: TeamReassignmentService::with_config(storage.clone(), config),
            storage,
            c1,
            c2,
            t1,
            t2,
            t9,
            admin,
            m,
            u1,
            u2,
            u3,
            x,
            platform,
        }
    }

    /// Every user in the organisation.
    pub fn everyone(&self) -> Vec<&User> {
        vec![
            &self.admin,
            &self.m,
            &self.u1,
            &self.u2,
            &self.u3,
            &self.x,
            &self.platform,
        ]
    }

    pub async fn ctx(&self, user: &User) -> TenantContext {
        DirectoryTenantResolver::new(self.storage.clone())
            .resolve_user(&user.id)
            .await
            .expect("fixture users resolve")
    }

    /// Give `owner` `count` records of `kind` in their own company.
    pub async fn seed(&self, kind: EntityKind, owner: &User, count: usize) {
        let company_id = owner.company_id.expect("seeded owners belong to a company");
        for _ in 0..count {
            self.storage
                .insert_record(OwnedRecord::new(
                    kind,
                    RecordStamp {
                        company_id,
                        owner_id: owner.id,
                    },
                ))
                .await;
        }
    }

    /// What `actor` sees of `kind` through their scope predicate.
    pub async fn visible(&self, kind: EntityKind, actor: &User) -> Vec<OwnedRecord> {
        let ctx = self.ctx(actor).await;
        let predicate = self
            .engine
            .scope_filter(kind, &ctx, None)
            .await
            .expect("scope filter");
        self.storage
            .find_matching(&predicate)
            .await
            .expect("find matching")
    }

    pub async fn owned_by(&self, kind: EntityKind, owner: &User) -> usize {
        self.storage
            .records(kind)
            .await
            .iter()
            .filter(|record| record.owner_id == owner.id)
            .count()
    }
}
