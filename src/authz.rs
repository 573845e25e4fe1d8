//! Authorization decisions. `decide` is pure: same inputs, same answer.

use thiserror::Error;
use uuid::Uuid;

/// User fields only an admin may change.
pub const PROTECTED_USER_FIELDS: &[&str] = &["email", "password", "is_admin"];

/// Who is asking, as carried by the bearer token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    User { id: Uuid, is_admin: bool },
}

impl Caller {
    pub fn id(&self) -> Option<Uuid> {
        match self {
            Caller::Anonymous => None,
            Caller::User { id, .. } => Some(*id),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Caller::User { is_admin: true, .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    User,
    Place,
    Review,
}

/// What a request targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    AdminOnly,
    AnyAuthenticated,
    /// A user (owned by themself), a place (its owner) or a review (its author).
    Owned { kind: ResourceKind, owner_id: Uuid },
    /// Creating a review on a place.
    ReviewTarget { place_owner_id: Uuid, already_reviewed: bool },
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    #[error("authentication required")]
    Unauthenticated,
    #[error("Admin privileges required")]
    AdminRequired,
    #[error("Unauthorized action")]
    NotOwner,
    #[error("You cannot modify {0}")]
    ProtectedField(String),
    #[error("You cannot review your own place")]
    OwnPlace,
    #[error("You have already reviewed this place")]
    AlreadyReviewed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Reject(Rejection),
}

impl Decision {
    pub fn into_result(self) -> Result<(), Rejection> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Reject(r) => Err(r),
        }
    }
}

/// Rules apply in order; the first match wins.
pub fn decide(caller: &Caller, resource: &Resource, requested_fields: &[&str]) -> Decision {
    let (caller_id, is_admin) = match caller {
        Caller::Anonymous => return Decision::Reject(Rejection::Unauthenticated),
        Caller::User { id, is_admin } => (*id, *is_admin),
    };
    if is_admin {
        return Decision::Allow;
    }
    match resource {
        Resource::AdminOnly => Decision::Reject(Rejection::AdminRequired),
        Resource::ReviewTarget {
            place_owner_id,
            already_reviewed,
        } => {
            if *place_owner_id == caller_id {
                Decision::Reject(Rejection::OwnPlace)
            } else if *already_reviewed {
                Decision::Reject(Rejection::AlreadyReviewed)
            } else {
                Decision::Allow
            }
        }
        Resource::Owned { kind, owner_id } if *owner_id == caller_id => {
            if *kind == ResourceKind::User {
                let protected = requested_fields
                    .iter()
                    .filter(|f| PROTECTED_USER_FIELDS.contains(f))
                    .copied()
                    .collect::<Vec<_>>();
                if !protected.is_empty() {
                    return Decision::Reject(Rejection::ProtectedField(protected.join(", ")));
                }
            }
            Decision::Allow
        }
        Resource::AnyAuthenticated => Decision::Allow,
        Resource::Owned { .. } => Decision::Reject(Rejection::NotOwner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: Uuid) -> Caller {
        Caller::User { id, is_admin: false }
    }

    fn admin() -> Caller {
        Caller::User {
            id: Uuid::new_v4(),
            is_admin: true,
        }
    }

    #[test]
    fn anonymous_is_always_rejected() {
        for resource in [
            Resource::AdminOnly,
            Resource::AnyAuthenticated,
            Resource::Owned {
                kind: ResourceKind::Place,
                owner_id: Uuid::new_v4(),
            },
        ] {
            assert_eq!(
                decide(&Caller::Anonymous, &resource, &[]),
                Decision::Reject(Rejection::Unauthenticated)
            );
        }
    }

    #[test]
    fn admin_passes_every_rule() {
        let someone = Uuid::new_v4();
        let resources = [
            Resource::AdminOnly,
            Resource::Owned {
                kind: ResourceKind::User,
                owner_id: someone,
            },
            Resource::ReviewTarget {
                place_owner_id: someone,
                already_reviewed: true,
            },
        ];
        for resource in resources {
            assert_eq!(decide(&admin(), &resource, &["email", "password"]), Decision::Allow);
        }
    }

    #[test]
    fn non_admin_cannot_reach_admin_only() {
        assert_eq!(
            decide(&user(Uuid::new_v4()), &Resource::AdminOnly, &[]),
            Decision::Reject(Rejection::AdminRequired)
        );
    }

    #[test]
    fn review_target_checks_own_place_before_duplicates() {
        let me = Uuid::new_v4();
        let own = Resource::ReviewTarget {
            place_owner_id: me,
            already_reviewed: true,
        };
        assert_eq!(decide(&user(me), &own, &[]), Decision::Reject(Rejection::OwnPlace));

        let again = Resource::ReviewTarget {
            place_owner_id: Uuid::new_v4(),
            already_reviewed: true,
        };
        assert_eq!(decide(&user(me), &again, &[]), Decision::Reject(Rejection::AlreadyReviewed));

        let fresh = Resource::ReviewTarget {
            place_owner_id: Uuid::new_v4(),
            already_reviewed: false,
        };
        assert_eq!(decide(&user(me), &fresh, &[]), Decision::Allow);
    }

    #[test]
    fn owners_may_edit_but_not_protected_user_fields() {
        let me = Uuid::new_v4();
        let myself = Resource::Owned {
            kind: ResourceKind::User,
            owner_id: me,
        };
        assert_eq!(decide(&user(me), &myself, &["first_name"]), Decision::Allow);
        assert_eq!(
            decide(&user(me), &myself, &["first_name", "email"]),
            Decision::Reject(Rejection::ProtectedField("email".into()))
        );
        assert_eq!(
            decide(&user(me), &myself, &["is_admin"]),
            Decision::Reject(Rejection::ProtectedField("is_admin".into()))
        );

        let my_place = Resource::Owned {
            kind: ResourceKind::Place,
            owner_id: me,
        };
        assert_eq!(decide(&user(me), &my_place, &["email"]), Decision::Allow);
    }

    #[test]
    fn strangers_are_not_owners() {
        let review = Resource::Owned {
            kind: ResourceKind::Review,
            owner_id: Uuid::new_v4(),
        };
        assert_eq!(
            decide(&user(Uuid::new_v4()), &review, &["text"]),
            Decision::Reject(Rejection::NotOwner)
        );
        assert_eq!(
            decide(&user(Uuid::new_v4()), &Resource::AnyAuthenticated, &[]),
            Decision::Allow
        );
    }

    #[test]
    fn decisions_are_deterministic() {
        let me = Uuid::new_v4();
        let caller = user(me);
        let resource = Resource::Owned {
            kind: ResourceKind::User,
            owner_id: me,
        };
        let first = decide(&caller, &resource, &["password"]);
        for _ in 0..10 {
            assert_eq!(decide(&caller, &resource, &["password"]), first);
        }
    }
}
