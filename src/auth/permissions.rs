//! Role and permission constants.
//!
//! Roles are coarse; permissions exist for the places where a screen is
//! shared between roles but an action is not.

use std::collections::HashMap;

use lazy_static::lazy_static;

use super::UserRole;

pub const PURCHASES_CREATE: &str = "purchases:create";
pub const PURCHASES_VIEW: &str = "purchases:view";
pub const PRODUCTS_MANAGE: &str = "products:manage";
pub const MARKETPLACE_BROWSE: &str = "marketplace:browse";
pub const COMPLAINTS_FILE: &str = "complaints:file";
pub const COMPLAINTS_REVIEW: &str = "complaints:review";
pub const USERS_REVIEW: &str = "users:review";
pub const REVIEWS_SUBMIT: &str = "reviews:submit";

lazy_static! {
    static ref ROLE_PERMISSIONS: HashMap<UserRole, Vec<&'static str>> = {
        let mut map = HashMap::new();
        map.insert(
            UserRole::Retailer,
            vec![
                PURCHASES_CREATE,
                PURCHASES_VIEW,
                MARKETPLACE_BROWSE,
                COMPLAINTS_FILE,
                REVIEWS_SUBMIT,
            ],
        );
        map.insert(
            UserRole::Supplier,
            vec![PURCHASES_VIEW, PRODUCTS_MANAGE, COMPLAINTS_FILE],
        );
        map.insert(
            UserRole::Admin,
            vec![
                PURCHASES_VIEW,
                COMPLAINTS_REVIEW,
                USERS_REVIEW,
                MARKETPLACE_BROWSE,
            ],
        );
        map
    };
}

/// Actions that require owning a trading profile; the admin bypass does
/// not apply to these.
const PROFILE_BOUND: &[&str] = &[PURCHASES_CREATE, REVIEWS_SUBMIT, COMPLAINTS_FILE, PRODUCTS_MANAGE];

pub fn role_has_permission(role: UserRole, permission: &str) -> bool {
    if role == UserRole::Admin && !PROFILE_BOUND.contains(&permission) {
        return true;
    }
    ROLE_PERMISSIONS
        .get(&role)
        .map(|perms| perms.contains(&permission))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retailer_can_create_purchases() {
        assert!(role_has_permission(UserRole::Retailer, PURCHASES_CREATE));
        assert!(!role_has_permission(UserRole::Supplier, PURCHASES_CREATE));
        assert!(!role_has_permission(UserRole::Admin, PURCHASES_CREATE));
    }

    #[test]
    fn admin_reaches_review_screens() {
        assert!(role_has_permission(UserRole::Admin, COMPLAINTS_REVIEW));
        assert!(role_has_permission(UserRole::Admin, USERS_REVIEW));
        assert!(!role_has_permission(UserRole::Retailer, USERS_REVIEW));
    }

    #[test]
    fn profile_bound_actions_have_no_admin_bypass() {
        assert!(role_has_permission(UserRole::Retailer, REVIEWS_SUBMIT));
        assert!(!role_has_permission(UserRole::Admin, REVIEWS_SUBMIT));
        assert!(!role_has_permission(UserRole::Admin, PRODUCTS_MANAGE));
    }
}
