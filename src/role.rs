//! Static role to capability table.
//!
//! The table is compiled in and never changes at runtime. Roles are a closed
//! enum, so adding one forces every match in the crate to be revisited.
//!
//! | Role          | Breadth                 |
//! |---------------|-------------------------|
//! | PlatformAdmin | every company           |
//! | CompanyAdmin  | own company, all teams  |
//! | TeamManager   | own team                |
//! | Contributor   | own records             |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Actor role, ordered from broadest to narrowest scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    PlatformAdmin,
    CompanyAdmin,
    TeamManager,
    Contributor,
}

/// A single capability flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    ViewAllCompanies,
    ViewCompanyData,
    ViewTeamData,
    ViewOwnData,
    ManageCompanyUsers,
    ManageTeamUsers,
    ManageTeams,
    ExportCompanyData,
    ExportTeamData,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Capability; 9] = [
        Capability::ViewAllCompanies,
        Capability::ViewCompanyData,
        Capability::ViewTeamData,
        Capability::ViewOwnData,
        Capability::ManageCompanyUsers,
        Capability::ManageTeamUsers,
        Capability::ManageTeams,
        Capability::ExportCompanyData,
        Capability::ExportTeamData,
    ];

    /// Wire name of the capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewAllCompanies => "VIEW_ALL_COMPANIES",
            Capability::ViewCompanyData => "VIEW_COMPANY_DATA",
            Capability::ViewTeamData => "VIEW_TEAM_DATA",
            Capability::ViewOwnData => "VIEW_OWN_DATA",
            Capability::ManageCompanyUsers => "MANAGE_COMPANY_USERS",
            Capability::ManageTeamUsers => "MANAGE_TEAM_USERS",
            Capability::ManageTeams => "MANAGE_TEAMS",
            Capability::ExportCompanyData => "EXPORT_COMPANY_DATA",
            Capability::ExportTeamData => "EXPORT_TEAM_DATA",
        }
    }
}

impl Role {
    /// Every role, broadest first.
    pub const ALL: [Role; 4] = [
        Role::PlatformAdmin,
        Role::CompanyAdmin,
        Role::TeamManager,
        Role::Contributor,
    ];

    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::PlatformAdmin => "platform_admin",
            Role::CompanyAdmin => "company_admin",
            Role::TeamManager => "team_manager",
            Role::Contributor => "contributor",
        }
    }

    /// Scope breadth, higher is broader.
    pub fn breadth(&self) -> u8 {
        match self {
            Role::PlatformAdmin => 3,
            Role::CompanyAdmin => 2,
            Role::TeamManager => 1,
            Role::Contributor => 0,
        }
    }

    /// Capabilities granted to this role.
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            Role::PlatformAdmin => &Capability::ALL,
            Role::CompanyAdmin => &[
                Capability::ViewCompanyData,
                Capability::ViewTeamData,
                Capability::ViewOwnData,
                Capability::ManageCompanyUsers,
                Capability::ManageTeamUsers,
                Capability::ManageTeams,
                Capability::ExportCompanyData,
                Capability::ExportTeamData,
            ],
            Role::TeamManager => &[
                Capability::ViewTeamData,
                Capability::ViewOwnData,
                Capability::ManageTeamUsers,
                Capability::ExportTeamData,
            ],
            Role::Contributor => &[Capability::ViewOwnData],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role or capability name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {what} '{name}'")]
pub struct UnknownName {
    what: &'static str,
    name: String,
}

impl FromStr for Role {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownName {
                what: "role",
                name: s.to_string(),
            })
    }
}

impl FromStr for Capability {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|cap| cap.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownName {
                what: "capability",
                name: s.to_string(),
            })
    }
}

/// Whether `role` holds `capability`.
pub fn has_capability(role: Role, capability: Capability) -> bool {
    role.capabilities().contains(&capability)
}

/// Name-based lookup for identity records that carry strings.
///
/// Unknown roles or capabilities yield `false`.
pub fn has_capability_named(role: &str, capability: &str) -> bool {
    match (role.parse::<Role>(), capability.parse::<Capability>()) {
        (Ok(role), Ok(capability)) => has_capability(role, capability),
        _ => false,
    }
}
