use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Role;

/// Screens of the point of sale, each gated by the roles allowed to open it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Login,
    Catalog,
    Cart,
    Checkout,
    Admin,
}

const ALL_ROLES: &[Role] = &[Role::Shopkeeper, Role::Admin];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

impl Page {
    pub fn path(&self) -> &'static str {
        match self {
            Page::Login => "/login",
            Page::Catalog => "/",
            Page::Cart => "/cart",
            Page::Checkout => "/checkout",
            Page::Admin => "/admin",
        }
    }

    /// `None` means the page is open to anonymous visitors.
    pub fn allowed_roles(&self) -> Option<&'static [Role]> {
        match self {
            Page::Login => None,
            Page::Catalog | Page::Cart | Page::Checkout => Some(ALL_ROLES),
            Page::Admin => Some(ADMIN_ONLY),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Page),
    Redirect(Page),
}

/// Decides whether a visitor with `role` may see `page`. Anonymous visitors
/// are sent to the login page and signed-in users without the role go home.
pub fn resolve(page: Page, role: Option<Role>) -> Navigation {
    let Some(allowed) = page.allowed_roles() else {
        return Navigation::Render(page);
    };
    match role {
        None => Navigation::Redirect(Page::Login),
        Some(role) if allowed.contains(&role) => Navigation::Render(page),
        Some(_) => Navigation::Redirect(Page::Catalog),
    }
}
