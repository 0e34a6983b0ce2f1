//! Role graph entities read from the persistence collaborator.
//!
//! The engine never writes these. The validation helpers exist for the CRUD layer,
//! which owns their lifecycle.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::permission::Permission;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectKind {
    #[default]
    User,
}

/// Entity a binding grants its role to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(default)]
    pub kind: SubjectKind,
    pub name: String,
}

impl Subject {
    #[must_use]
    pub fn user(name: &str) -> Self {
        Self {
            kind: SubjectKind::User,
            name: name.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
}

impl User {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }
}

/// Project-scoped role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub project: String,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// Unscoped role, granted across the wildcard project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalRole {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBinding {
    pub project: String,
    pub name: String,
    /// Name of a [`Role`] in the same project. Immutable after creation.
    pub role: String,
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalRoleBinding {
    pub name: String,
    /// Name of a [`GlobalRole`]. Immutable after creation.
    pub role: String,
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

fn has_subject(subjects: &[Subject], kind: SubjectKind, name: &str) -> bool {
    subjects.iter().any(|s| s.kind == kind && s.name == name)
}

fn ensure_subjects(binding: &str, subjects: &[Subject]) -> Result<(), ValidationError> {
    if subjects.is_empty() {
        return Err(ValidationError::NoSubject {
            binding: binding.to_owned(),
        });
    }
    Ok(())
}

fn ensure_same_role(binding: &str, previous: &str, requested: &str) -> Result<(), ValidationError> {
    if previous != requested {
        return Err(ValidationError::RoleChanged {
            binding: binding.to_owned(),
            previous: previous.to_owned(),
            requested: requested.to_owned(),
        });
    }
    Ok(())
}

impl RoleBinding {
    #[must_use]
    pub fn has(&self, kind: SubjectKind, name: &str) -> bool {
        has_subject(&self.subjects, kind, name)
    }

    /// Checks that the binding has subjects and that its role exists in its project.
    ///
    /// # Errors
    ///
    /// [`ValidationError::NoSubject`] or [`ValidationError::RoleNotFound`].
    pub fn validate_role_reference(&self, roles: &[Role]) -> Result<(), ValidationError> {
        ensure_subjects(&self.name, &self.subjects)?;
        if roles
            .iter()
            .any(|r| r.project == self.project && r.name == self.role)
        {
            Ok(())
        } else {
            Err(ValidationError::RoleNotFound {
                binding: format!("{}/{}", self.project, self.name),
                role: self.role.clone(),
            })
        }
    }

    /// # Errors
    ///
    /// [`ValidationError::RoleChanged`] when the update targets another role.
    pub fn validate_update(&self, previous: &RoleBinding) -> Result<(), ValidationError> {
        ensure_same_role(&self.name, &previous.role, &self.role)
    }
}

impl GlobalRoleBinding {
    #[must_use]
    pub fn has(&self, kind: SubjectKind, name: &str) -> bool {
        has_subject(&self.subjects, kind, name)
    }

    /// # Errors
    ///
    /// [`ValidationError::NoSubject`] or [`ValidationError::RoleNotFound`].
    pub fn validate_role_reference(&self, roles: &[GlobalRole]) -> Result<(), ValidationError> {
        ensure_subjects(&self.name, &self.subjects)?;
        if roles.iter().any(|r| r.name == self.role) {
            Ok(())
        } else {
            Err(ValidationError::RoleNotFound {
                binding: self.name.clone(),
                role: self.role.clone(),
            })
        }
    }

    /// # Errors
    ///
    /// [`ValidationError::RoleChanged`] when the update targets another role.
    pub fn validate_update(&self, previous: &GlobalRoleBinding) -> Result<(), ValidationError> {
        ensure_same_role(&self.name, &previous.role, &self.role)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::permission::{Action, Scope};

    fn binding(role: &str) -> RoleBinding {
        RoleBinding {
            project: "project0".to_owned(),
            name: "viewers".to_owned(),
            role: role.to_owned(),
            subjects: vec![Subject::user("user0")],
        }
    }

    fn viewer_role(project: &str) -> Role {
        Role {
            project: project.to_owned(),
            name: "viewer".to_owned(),
            permissions: vec![Permission::new([Action::Read], [Scope::Dashboard])],
        }
    }

    #[test]
    fn has_matches_kind_and_name() {
        let b = binding("viewer");
        assert!(b.has(SubjectKind::User, "user0"));
        assert!(!b.has(SubjectKind::User, "user1"));
    }

    #[test]
    fn role_reference_must_exist_in_same_project() {
        let b = binding("viewer");
        assert!(b.validate_role_reference(&[viewer_role("project0")]).is_ok());

        let err = b
            .validate_role_reference(&[viewer_role("project1")])
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::RoleNotFound {
                binding: "project0/viewers".to_owned(),
                role: "viewer".to_owned(),
            }
        );
    }

    #[test]
    fn binding_without_subject_is_rejected() {
        let mut b = binding("viewer");
        b.subjects.clear();
        assert!(matches!(
            b.validate_role_reference(&[viewer_role("project0")]),
            Err(ValidationError::NoSubject { .. })
        ));
    }

    #[test]
    fn role_name_is_immutable_on_update() {
        let previous = binding("viewer");
        assert!(binding("viewer").validate_update(&previous).is_ok());

        let mut subjects_changed = binding("viewer");
        subjects_changed.subjects.push(Subject::user("user1"));
        assert!(subjects_changed.validate_update(&previous).is_ok());

        assert!(matches!(
            binding("editor").validate_update(&previous),
            Err(ValidationError::RoleChanged { .. })
        ));
    }

    #[test]
    fn global_binding_validation() {
        let admin = GlobalRole {
            name: "admin".to_owned(),
            permissions: vec![Permission::all()],
        };
        let gb = GlobalRoleBinding {
            name: "admins".to_owned(),
            role: "admin".to_owned(),
            subjects: vec![Subject::user("admin")],
        };
        assert!(gb.validate_role_reference(std::slice::from_ref(&admin)).is_ok());
        assert!(gb.validate_role_reference(&[]).is_err());

        let changed = GlobalRoleBinding {
            role: "viewer".to_owned(),
            ..gb.clone()
        };
        assert!(changed.validate_update(&gb).is_err());
    }

    #[test]
    fn subject_kind_defaults_to_user() {
        let s: Subject = serde_json::from_str(r#"{"name":"user0"}"#).unwrap();
        assert_eq!(s, Subject::user("user0"));
    }
}
