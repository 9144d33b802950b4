//! Dashboard overview and section pages.
//!
//! Section content is managed by the backend API; these pages render the
//! permission-aware frame around it.

use crate::permissions::{Can, list_assignable_roles, use_permissions};
use leptos::prelude::*;
use leptos_router::hooks::use_params_map;
use lostfound_access::permission::names;
use lostfound_access::{DEFAULT_ROLE, ResolvedSession};

/// A dashboard section and the permission that opens it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub slug: &'static str,
    pub href: &'static str,
    pub title: &'static str,
    pub permission: &'static str,
}

const fn section(
    slug: &'static str,
    href: &'static str,
    title: &'static str,
    permission: &'static str,
) -> Section {
    Section {
        slug,
        href,
        title,
        permission,
    }
}

/// Navigation order of the dashboard sections.
pub static SECTIONS: [Section; 11] = [
    section("items", "/dashboard/items", "Items", names::MANAGE_ITEMS),
    section(
        "missing-items",
        "/dashboard/missing-items",
        "Missing items",
        names::MANAGE_MISSING_ITEMS,
    ),
    section("claims", "/dashboard/claims", "Claims", names::MANAGE_CLAIMS),
    section(
        "item-types",
        "/dashboard/item-types",
        "Item types",
        names::MANAGE_ITEM_TYPES,
    ),
    section("branches", "/dashboard/branches", "Branches", names::MANAGE_BRANCHES),
    section(
        "addresses",
        "/dashboard/addresses",
        "Addresses",
        names::MANAGE_ADDRESSES,
    ),
    section(
        "organizations",
        "/dashboard/organizations",
        "Organizations",
        names::MANAGE_ORGANIZATIONS,
    ),
    section(
        "transfer-requests",
        "/dashboard/transfer-requests",
        "Transfer requests",
        names::MANAGE_TRANSFER_REQUESTS,
    ),
    section("users", "/dashboard/users", "Users", names::MANAGE_USERS),
    section("roles", "/dashboard/roles", "Roles", names::MANAGE_ROLES),
    section(
        "permissions",
        "/dashboard/permissions",
        "Permissions",
        names::MANAGE_PERMISSIONS,
    ),
];

/// Finds a section by its path segment.
pub fn find_section(slug: &str) -> Option<&'static Section> {
    SECTIONS.iter().find(|section| section.slug == slug)
}

/// Role labels offered when assigning a role to a user.
const ROLE_CANDIDATES: [&str; 4] = [DEFAULT_ROLE, "moderator", "admin", "super_admin"];

/// Sections the session may open, or `None` while it is still loading.
fn visible_sections(session: &ResolvedSession) -> Option<Vec<&'static Section>> {
    if session.is_loading() {
        return None;
    }
    Some(
        SECTIONS
            .iter()
            .filter(|section| session.is_authenticated() && session.has_permission(section.permission))
            .collect(),
    )
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let permissions = use_permissions();

    view! {
        <div class="dashboard-page">
            <h1>"Dashboard"</h1>
            {move || match visible_sections(&permissions.session()) {
                None => view! { <p>"Loading..."</p> }.into_any(),
                Some(sections) if sections.is_empty() => view! {
                    <p class="empty-state">"No dashboard sections are available to you."</p>
                }
                .into_any(),
                Some(sections) => view! {
                    <ul class="section-list">
                        {sections
                            .into_iter()
                            .map(|section| {
                                view! {
                                    <li>
                                        <a href=section.href>{section.title}</a>
                                    </li>
                                }
                            })
                            .collect_view()}
                    </ul>
                }
                .into_any(),
            }}
        </div>
    }
}

/// Lists the role labels the caller may hand out.
#[component]
fn AssignableRoles() -> impl IntoView {
    let roles = Resource::new(
        || (),
        |_| list_assignable_roles(ROLE_CANDIDATES.iter().map(|role| role.to_string()).collect()),
    );

    view! {
        <section class="assignable-roles">
            <h2>"Assignable roles"</h2>
            <Suspense fallback=move || view! { <p>"Loading..."</p> }>
                {move || {
                    roles.get().map(|result| match result {
                        Ok(roles) if roles.is_empty() => view! {
                            <p class="empty-state">"You cannot assign roles."</p>
                        }
                        .into_any(),
                        Ok(roles) => view! {
                            <ul>
                                {roles.into_iter().map(|role| view! { <li>{role}</li> }).collect_view()}
                            </ul>
                        }
                        .into_any(),
                        Err(e) => view! { <p class="error">{e.to_string()}</p> }.into_any(),
                    })
                }}
            </Suspense>
        </section>
    }
}

#[component]
pub fn SectionPage() -> impl IntoView {
    let params = use_params_map();
    let section = move || params.read().get("section").as_deref().and_then(find_section);

    view! {
        {move || match section() {
            Some(section) => view! {
                <div class="section-page">
                    <h1>{section.title}</h1>
                    <Can
                        permission=section.permission
                        fallback=|| view! { <p>"You do not have access to this section."</p> }
                    >
                        <p>"Records for this section are loaded from the Lost & Found API."</p>
                        {matches!(section.slug, "users" | "roles").then(|| view! { <AssignableRoles/> })}
                    </Can>
                </div>
            }
            .into_any(),
            None => view! { <p>"Page not found."</p> }.into_any(),
        }}
    }
}
