use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use super::{StorefrontConfig, SystemError};
use crate::auto_sync;
use crate::cart_actor::CartService;
use crate::catalog::{catalog_view, CatalogQuery};
use crate::clients::CartClient;
use crate::domain::{Artwork, Identity, Role};
use crate::remote::{HttpStorefrontApi, LoginRequest, StorefrontApi};
use crate::session::{SessionFile, SessionHandle};

/// The storefront client: cart actor, session and optional auto sync task.
///
/// Starts every background task and hands out the clients that talk to them.
pub struct StorefrontSystem<A: StorefrontApi> {
    pub cart_client: CartClient,
    pub session: SessionHandle,
    api: Arc<A>,
    handles: Vec<JoinHandle<()>>,
}

impl StorefrontSystem<HttpStorefrontApi> {
    /// Wires the HTTP API and restores any persisted session.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, SystemError> {
        let api = HttpStorefrontApi::new(config.api_url.clone(), config.request_timeout)?;
        let store = config.session_file.clone().map(SessionFile::new);
        let session = SessionHandle::restore(store);
        Ok(Self::start(
            Arc::new(api),
            session,
            config.channel_buffer,
            config.auto_sync,
        ))
    }
}

impl<A: StorefrontApi> StorefrontSystem<A> {
    pub fn start(api: Arc<A>, session: SessionHandle, buffer_size: usize, auto_sync: bool) -> Self {
        let (cart_service, cart_client) =
            CartService::new(buffer_size, api.clone(), session.clone());
        let mut handles = vec![tokio::spawn(cart_service.run())];

        if auto_sync {
            handles.push(tokio::spawn(auto_sync::run(
                cart_client.clone(),
                session.subscribe(),
            )));
        }

        info!(auto_sync, "Storefront system started");
        Self {
            cart_client,
            session,
            api,
            handles,
        }
    }

    #[instrument(fields(email = %email, role = %role), skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Identity, SystemError> {
        let response = self
            .api
            .login(LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
                role,
            })
            .await?;
        info!(user_id = response.user.id, "Logged in");
        self.session.login(response.user.clone(), response.token);
        Ok(response.user)
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    /// Loads the catalog and applies the browse filters to it.
    #[instrument(fields(search = %query.search, sort = %query.sort), skip(self, query))]
    pub async fn browse(&self, query: &CatalogQuery) -> Result<Vec<Artwork>, SystemError> {
        let artworks = self.api.list_artworks().await?;
        let view = catalog_view(&artworks, query);
        info!(total = artworks.len(), shown = view.len(), "Catalog loaded");
        Ok(view)
    }

    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");
        // Auto sync exits once the cart actor drops its state channel.
        self.cart_client.shutdown().await?;
        drop(self.cart_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Task failed: {:?}", e);
                return Err(SystemError::TaskFailed(format!("{e:?}")));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
