//! Servicios de API por colección.
//!
//! `HttpCollection` traduce las tres operaciones lógicas de `RemoteCollection` a
//! peticiones `POST` sobre la ruta configurada de cada entidad. `EntityService` es una
//! capa de paso que registra cada llamada antes de delegar.


use std::marker::PhantomData;
use std::sync::Arc;
use async_trait::async_trait;
use tracing::{debug, error};
use crate::api::domain::{Page, PageRequest, RemoteCollection};
use crate::entities::domain::Entity;
use crate::http::logic::ApiClient;
use crate::system::domain::ErrorType;


pub struct HttpCollection<E> {
    client: ApiClient,
    _entity: PhantomData<fn() -> E>,
}


impl<E: Entity> HttpCollection<E> {
    pub fn new(client: ApiClient) -> Self {
        Self { client, _entity: PhantomData }
    }
}


#[async_trait]
impl<E: Entity> RemoteCollection<E> for HttpCollection<E> {
    async fn list(&self, request: PageRequest<E::Filter>) -> Result<Page<E>, ErrorType> {
        let config = E::config();
        self.client.post(config.list_route(), &request).await.inspect_err(|e| {
            error!("Error: no se pudo listar {}: {}", config.kind, e);
        })
    }

    async fn create(&self, payload: E::Insert) -> Result<(), ErrorType> {
        let config = E::config();
        self.client.post_unit(&config.insert_route(), &payload).await.inspect_err(|e| {
            error!("Error: no se pudo insertar en {}: {}", config.kind, e);
        })
    }

    async fn update(&self, payload: E::Update) -> Result<(), ErrorType> {
        let config = E::config();
        self.client.post_unit(&config.update_route(), &payload).await.inspect_err(|e| {
            error!("Error: no se pudo actualizar en {}: {}", config.kind, e);
        })
    }
}


/// Servicio de dominio: delega en la implementación remota.
pub struct EntityService<E: Entity> {
    remote: Arc<dyn RemoteCollection<E>>,
}


impl<E: Entity> EntityService<E> {
    pub fn new(remote: Arc<dyn RemoteCollection<E>>) -> Self {
        Self { remote }
    }

    pub fn over_http(client: ApiClient) -> Self {
        Self::new(Arc::new(HttpCollection::<E>::new(client)))
    }
}


#[async_trait]
impl<E: Entity> RemoteCollection<E> for EntityService<E> {
    async fn list(&self, request: PageRequest<E::Filter>) -> Result<Page<E>, ErrorType> {
        debug!("Debug: {} solicitando página, limite {} cursor {:?}", E::config().kind, request.limit, request.cursor);
        let page = self.remote.list(request).await?;
        debug!("Debug: {} recibió {} registros", E::config().kind, page.items.len());
        Ok(page)
    }

    async fn create(&self, payload: E::Insert) -> Result<(), ErrorType> {
        debug!("Debug: {} insertando {:?}", E::config().kind, payload);
        self.remote.create(payload).await
    }

    async fn update(&self, payload: E::Update) -> Result<(), ErrorType> {
        debug!("Debug: {} actualizando {:?}", E::config().kind, payload);
        self.remote.update(payload).await
    }
}
