//! Role model and capability groups for applet/workspace access control.
//!
//! Roles are not hierarchical in permission terms, but carry a strict
//! priority order used for tie-breaking when a user holds several roles on
//! the same applet. Capability checks are membership tests against the
//! static groups below, independent of the priority order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A ranked capability level a user holds on an applet or workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Owner,
    Manager,
    Coordinator,
    Editor,
    Reviewer,
    Respondent,
}

/// Priority rank assigned to roles the resolver does not recognize.
pub const UNKNOWN_ROLE_PRIORITY: i32 = 10;

impl Role {
    /// Priority rank for tie-breaking; lower wins.
    pub fn priority(&self) -> i32 {
        match self {
            Role::SuperAdmin => 0,
            Role::Owner => 1,
            Role::Manager => 2,
            Role::Coordinator => 3,
            Role::Editor => 4,
            Role::Reviewer => 5,
            Role::Respondent => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Owner => "owner",
            Role::Manager => "manager",
            Role::Coordinator => "coordinator",
            Role::Editor => "editor",
            Role::Reviewer => "reviewer",
            Role::Respondent => "respondent",
        }
    }

    /// Roles that can create, edit, duplicate and delete applets.
    pub fn editors() -> &'static [Role] {
        &[Role::Owner, Role::Manager, Role::Editor]
    }

    /// Roles that can send invitations of lower-or-equal rank.
    pub fn inviters() -> &'static [Role] {
        &[Role::Owner, Role::Manager, Role::Coordinator]
    }

    /// Roles that manage respondent schedules and notifications.
    pub fn schedulers() -> &'static [Role] {
        &[Role::Owner, Role::Manager, Role::Coordinator]
    }

    /// Roles that can see assigned respondent data.
    pub fn reviewers() -> &'static [Role] {
        &[Role::Owner, Role::Manager, Role::Reviewer]
    }

    /// Roles that can see any respondent data.
    pub fn super_reviewers() -> &'static [Role] {
        &[Role::Owner, Role::Manager]
    }

    /// Administrative roles, everything except respondent.
    pub fn managers() -> &'static [Role] {
        &[
            Role::Owner,
            Role::Manager,
            Role::Coordinator,
            Role::Editor,
            Role::Reviewer,
        ]
    }

    /// Manager-class roles assignable through a managers invitation.
    pub fn invitable_managers() -> &'static [Role] {
        &[Role::Manager, Role::Coordinator, Role::Editor]
    }

    /// Stringified role names for binding to `role = ANY($n)` queries.
    pub fn names(roles: &[Role]) -> Vec<String> {
        roles.iter().map(|r| r.as_str().to_string()).collect()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Role::SuperAdmin),
            "owner" => Ok(Role::Owner),
            "manager" => Ok(Role::Manager),
            "coordinator" => Ok(Role::Coordinator),
            "editor" => Ok(Role::Editor),
            "reviewer" => Ok(Role::Reviewer),
            "respondent" => Ok(Role::Respondent),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        assert!(Role::Owner.priority() < Role::Manager.priority());
        assert!(Role::Manager.priority() < Role::Coordinator.priority());
        assert!(Role::Coordinator.priority() < Role::Editor.priority());
        assert!(Role::Editor.priority() < Role::Reviewer.priority());
        assert!(Role::Reviewer.priority() < Role::Respondent.priority());
        assert!(Role::Respondent.priority() < UNKNOWN_ROLE_PRIORITY);
    }

    #[test]
    fn test_manager_beats_respondent() {
        let roles = [Role::Respondent, Role::Manager];
        let highest = roles.iter().min_by_key(|r| r.priority()).unwrap();
        assert_eq!(*highest, Role::Manager);
    }

    #[test]
    fn test_roundtrip_parse() {
        for role in [
            Role::SuperAdmin,
            Role::Owner,
            Role::Manager,
            Role::Coordinator,
            Role::Editor,
            Role::Reviewer,
            Role::Respondent,
        ] {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn test_unknown_role() {
        let err = Role::from_str("administrator").unwrap_err();
        assert_eq!(err, UnknownRole("administrator".to_string()));
    }

    #[test]
    fn test_capability_groups() {
        assert!(Role::editors().contains(&Role::Editor));
        assert!(!Role::editors().contains(&Role::Coordinator));
        assert!(Role::inviters().contains(&Role::Coordinator));
        assert!(!Role::inviters().contains(&Role::Editor));
        assert!(Role::schedulers().contains(&Role::Coordinator));
        assert!(!Role::schedulers().contains(&Role::Editor));
        assert!(Role::reviewers().contains(&Role::Reviewer));
        assert!(!Role::super_reviewers().contains(&Role::Reviewer));
        assert!(!Role::managers().contains(&Role::Respondent));
    }

    #[test]
    fn test_serde_representation() {
        assert_eq!(serde_json::to_string(&Role::Owner).unwrap(), "\"owner\"");
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            "\"super_admin\""
        );
        let parsed: Role = serde_json::from_str("\"respondent\"").unwrap();
        assert_eq!(parsed, Role::Respondent);
    }

    #[test]
    fn test_names_binding_helper() {
        let names = Role::names(Role::super_reviewers());
        assert_eq!(names, vec!["owner".to_string(), "manager".to_string()]);
    }
}
