//! Session bootstrap: provider, backend login, tool catalog, agent.

use jamespot_agent::AgentLoop;
use jamespot_backend::JamespotClient;
use jamespot_config::AppConfig;
use jamespot_core::backend::{BackendClient, UserProfile};
use jamespot_core::error::Error;
use jamespot_core::provider::Provider;
use jamespot_tools::{build_catalog, CatalogOptions};
use std::sync::Arc;
use tracing::info;

/// Everything the conversation driver needs.
pub struct Session {
    pub agent: AgentLoop,
    pub user: UserProfile,
    /// One line per LLM setting, secrets masked
    pub llm_summary: Vec<String>,
    pub system_prompt: Option<String>,
    pub debug: bool,
}

impl Session {
    /// Build a session from configuration.
    ///
    /// The LLM provider is validated first, so a misconfigured provider
    /// fails without any network traffic. Then the backend login runs and
    /// the tool catalog is assembled.
    pub async fn start(config: &AppConfig) -> Result<Self, Error> {
        let provider = jamespot_providers::build_provider(&config.llm)?;

        let credentials = config
            .backend
            .credentials()
            .map_err(|e| Error::Config { message: e.to_string() })?;
        let client = JamespotClient::new(credentials.backend_url.as_str(), credentials.token.clone())?;

        Self::with_parts(
            Arc::new(client),
            provider,
            &credentials.email,
            &credentials.password,
            config,
        )
        .await
    }

    /// Log in through `client` and wire the agent around `provider`.
    pub async fn with_parts(
        client: Arc<dyn BackendClient>,
        provider: Arc<dyn Provider>,
        email: &str,
        password: &str,
        config: &AppConfig,
    ) -> Result<Self, Error> {
        let options = CatalogOptions {
            debug: config.agent.debug,
            unsplash_access_key: config.image_search.unsplash_access_key.clone(),
        };
        let catalog = build_catalog(client, email, password, &options).await?;

        let model = jamespot_providers::resolve_model(&config.llm);
        info!(provider = provider.name(), model = %model, tools = catalog.registry.len(), "Agent ready");

        let agent = AgentLoop::new(provider, model, config.llm.temperature, Arc::new(catalog.registry))
            .with_max_tokens(config.llm.max_tokens)
            .with_max_roundtrips(config.agent.max_roundtrips);

        Ok(Self {
            agent,
            user: catalog.user,
            llm_summary: jamespot_providers::describe(&config.llm),
            system_prompt: config.agent.system_prompt.clone(),
            debug: config.agent.debug,
        })
    }
}
