//! Tool catalog: log in once, then assemble every group into one ordered
//! registry sharing the same session.

use crate::image_search::UnsplashClient;
use crate::support::ToolContext;
use crate::{applications, calendar, content, datetime, files, groups, image_search, messenger, network, users};
use jamespot_core::backend::{BackendClient, UserProfile};
use jamespot_core::error::Error;
use jamespot_core::tool::ToolRegistry;
use std::sync::Arc;
use tracing::{info, warn};

/// What the catalog needs besides the client.
#[derive(Clone, Default)]
pub struct CatalogOptions {
    pub debug: bool,
    pub unsplash_access_key: Option<String>,
}

/// The assembled catalog and the user it acts as.
pub struct Catalog {
    pub registry: ToolRegistry,
    pub user: UserProfile,
}

/// Sign in, then build every tool group in catalog order.
///
/// A failed sign-in is fatal: no tool is built.
pub async fn build_catalog(
    client: Arc<dyn BackendClient>,
    email: &str,
    password: &str,
    options: &CatalogOptions,
) -> Result<Catalog, Error> {
    let user = client
        .login(email, password)
        .await
        .map_err(|e| Error::Auth(e.to_string()))?;
    info!(user_id = user.id, name = %user.display_name(), "Logged in");

    let registry = build_registry(client, user.clone(), options)?;
    info!(tools = registry.len(), "Tool catalog ready");
    Ok(Catalog { registry, user })
}

/// Assemble the registry for an already signed-in user.
pub fn build_registry(
    client: Arc<dyn BackendClient>,
    user: UserProfile,
    options: &CatalogOptions,
) -> Result<ToolRegistry, Error> {
    let ctx = ToolContext::new(client, user, options.debug);

    let unsplash = match options.unsplash_access_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => match UnsplashClient::new(key) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                warn!(error = %e, "Image search disabled");
                None
            }
        },
        None => None,
    };

    let mut registry = ToolRegistry::new();
    registry.extend(datetime::tools(options.debug))?;
    registry.extend(users::tools(&ctx))?;
    registry.extend(groups::tools(&ctx))?;
    registry.extend(content::tools(&ctx))?;
    registry.extend(messenger::tools(&ctx))?;
    registry.extend(applications::tools(&ctx))?;
    registry.extend(image_search::tools(unsplash, options.debug))?;
    registry.extend(files::tools(&ctx))?;
    registry.extend(network::tools(&ctx))?;
    registry.extend(calendar::social_event_tools(&ctx))?;
    registry.extend(calendar::meeting_tools(&ctx))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_user, MockBackend};
    use async_trait::async_trait;
    use jamespot_core::backend::Envelope;
    use jamespot_core::error::BackendError;
    use serde_json::Value;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn catalog_is_built_after_login() {
        let backend = MockBackend::new();
        let catalog = build_catalog(Arc::new(backend), "a@b.c", "pw", &CatalogOptions::default())
            .await
            .unwrap();
        assert_eq!(catalog.user.id, 123);
        assert_eq!(catalog.registry.len(), 59);
    }

    #[test]
    fn names_are_unique_and_ordered_by_group() {
        let registry = build_registry(Arc::new(MockBackend::new()), test_user(), &CatalogOptions::default()).unwrap();
        let names = registry.names();
        let unique: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(unique.len(), names.len());

        assert_eq!(names[0], "jamespot_get_current_datetime");
        assert_eq!(names[2], "jamespot_get_current_user");
        assert_eq!(names.last().copied(), Some("jamespot_delete_meeting"));

        let position = |name: &str| names.iter().position(|n| *n == name).unwrap();
        assert!(position("jamespot_list_groups") < position("jamespot_create_article"));
        assert!(position("search_unsplash_images") < position("jamespot_get_file"));
        assert!(position("jamespot_get_upload_token") < position("jamespot_create_social_event"));
    }

    #[test]
    fn every_name_but_image_search_is_prefixed() {
        let registry = build_registry(Arc::new(MockBackend::new()), test_user(), &CatalogOptions::default()).unwrap();
        for name in registry.names() {
            assert!(name.starts_with("jamespot_") || name.contains("unsplash"), "{name}");
        }
    }

    struct RejectingBackend {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BackendClient for RejectingBackend {
        fn backend_url(&self) -> &str {
            "https://test.jamespot.pro"
        }

        async fn login(&self, _email: &str, _password: &str) -> Result<UserProfile, BackendError> {
            Envelope::failure(7, "bad credentials")
                .into_result("Login failed")
                .and_then(UserProfile::from_value)
        }

        async fn call(&self, _operation: &str, _params: Value) -> Result<Envelope, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(BackendError::Transport("unexpected".into()))
        }

        async fn fetch_page(&self, _query: &[(&str, &str)], _form: Option<&[(&str, &str)]>) -> Result<String, BackendError> {
            Err(BackendError::Transport("unexpected".into()))
        }
    }

    #[tokio::test]
    async fn failed_login_is_an_auth_error() {
        let backend = Arc::new(RejectingBackend { calls: AtomicUsize::new(0) });
        let err = build_catalog(backend.clone(), "a@b.c", "wrong", &CatalogOptions::default())
            .await
            .err()
            .unwrap();
        match err {
            Error::Auth(message) => assert_eq!(message, "bad credentials"),
            other => panic!("expected auth error, got {other:?}"),
        }
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }
}
