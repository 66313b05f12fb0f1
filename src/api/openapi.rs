use super::{
    gate,
    handlers::{auth, health, me, users},
};
use axum::middleware;
use utoipa::openapi::{Contact, InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Reuse the same router wiring and only return the generated OpenAPI document.
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Add new endpoints here via `.routes(routes!(...))` so they are both served
/// and included in the generated `OpenAPI` document.
pub(crate) fn api_router() -> OpenApiRouter {
    // `/me` re-resolves the user on every call before the handler runs.
    let me_router = OpenApiRouter::new()
        .routes(routes!(me::me))
        .route_layer(middleware::from_fn(gate::ensure_logged_in));

    let mut router = OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(users::register))
        .routes(routes!(auth::login))
        .routes(routes!(auth::logout))
        .routes(routes!(users::list))
        .merge(me_router);

    let mut auth_tag = Tag::new("auth");
    auth_tag.description = Some("Session login and logout".to_string());

    let mut users_tag = Tag::new("users");
    users_tag.description = Some("Registration and user lookup".to_string());

    router.get_openapi_mut().tags = Some(vec![auth_tag, users_tag]);

    router
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(Some(env!("CARGO_PKG_DESCRIPTION")))
        .license(Some(License::new(env!("CARGO_PKG_LICENSE"))))
        .build();
    info.contact = contact(env!("CARGO_PKG_AUTHORS"));

    OpenApiBuilder::new().info(info).build()
}

/// First Cargo author as the API contact, e.g. `Team Authgate <team@authgate.dev>`.
fn contact(authors: &str) -> Option<Contact> {
    let author = authors.split(':').next()?.trim();
    if author.is_empty() {
        return None;
    }

    let mut contact = Contact::new();
    match author.split_once('<') {
        Some((name, email)) => {
            contact.name = Some(name.trim().to_string()).filter(|name| !name.is_empty());
            contact.email = Some(email.trim_end_matches('>').trim().to_string());
        }
        None => contact.name = Some(author.to_string()),
    }
    Some(contact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let doc = openapi();
        assert_eq!(doc.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(doc.info.version, env!("CARGO_PKG_VERSION"));

        let contact = doc.info.contact;
        assert!(contact.is_some());
        if let Some(contact) = contact {
            assert_eq!(contact.name.as_deref(), Some("Team Authgate"));
            assert_eq!(contact.email.as_deref(), Some("team@authgate.dev"));
        }
    }

    #[test]
    fn openapi_documents_every_route() {
        let doc = openapi();
        for path in ["/health", "/users", "/login", "/logout", "/me", "/restricted/users"] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing {path} in OpenAPI paths"
            );
        }
    }

    #[test]
    fn contact_from_authors() {
        let first = contact("Solo:Other <other@example.com>");
        assert_eq!(first.and_then(|c| c.name), Some("Solo".to_string()));

        let email_only = contact("<ops@example.com>");
        assert!(email_only.as_ref().is_some_and(|c| c.name.is_none()));
        assert_eq!(
            email_only.and_then(|c| c.email),
            Some("ops@example.com".to_string())
        );

        assert!(contact("").is_none());
    }
}
