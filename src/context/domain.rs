//! Definición del Contexto de Aplicación (Shared State).
//!
//! `AppContext` agrupa los recursos compartidos por todas las tareas: configuración,
//! cliente HTTP, bus de eventos, canal de avisos y overlay de carga.
//! `Stores` reúne los handles de las cinco colecciones una vez iniciadas.


use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use crate::api::domain::RemoteCollection;
use crate::api::logic::EntityService;
use crate::entities::domain::Entity;
use crate::entities::goal::Goal;
use crate::entities::measure_unit::MeasureUnit;
use crate::entities::production::Production;
use crate::entities::sale::Sale;
use crate::entities::transaction::Transaction;
use crate::events::logic::EventBus;
use crate::form::logic::FormBinding;
use crate::http::logic::ApiClient;
use crate::loading::logic::LoadingOverlay;
use crate::notification::domain::Notification;
use crate::notification::logic::Notifier;
use crate::store::domain::LoadOutcome;
use crate::store::logic::{StoreContext, StoreHandle};
use crate::system::domain::{ErrorType, System};


#[derive(Clone, Debug)]
pub struct AppContext {
    pub system: Arc<System>,
    pub api: ApiClient,
    pub events: EventBus,
    pub notifier: Notifier,
    pub overlay: LoadingOverlay,
}


impl AppContext {
    pub fn new(system: System, to_notifier: mpsc::Sender<Notification>) -> Result<Self, ErrorType> {
        let api = ApiClient::new(&system)?;
        Ok(Self {
            system: Arc::new(system),
            api,
            events: EventBus::new(),
            notifier: Notifier::new(to_notifier),
            overlay: LoadingOverlay::new(),
        })
    }

    pub fn store_context(&self) -> StoreContext {
        StoreContext {
            notifier: self.notifier.clone(),
            events: self.events.clone(),
            deadline: self.system.request_timeout(),
        }
    }

    /// Servicio HTTP de la colección `E`.
    pub fn service<E: Entity>(&self) -> Arc<dyn RemoteCollection<E>> {
        Arc::new(EntityService::<E>::over_http(self.api.clone()))
    }

    /// Formulario enlazado al store `store`, con el overlay global.
    pub fn form<E: Entity>(&self, store: &StoreHandle<E>) -> FormBinding<E> {
        FormBinding::new(store.clone(), self.overlay.clone())
    }
}


#[derive(Clone)]
pub struct Stores {
    pub production: StoreHandle<Production>,
    pub measure_units: StoreHandle<MeasureUnit>,
    pub goals: StoreHandle<Goal>,
    pub sales: StoreHandle<Sale>,
    pub transactions: StoreHandle<Transaction>,
}


impl Stores {
    /// Carga la primera página de todas las colecciones en paralelo.
    pub async fn reset_all(&self) -> [LoadOutcome; 5] {
        let (production, measure_units, goals, sales, transactions) = tokio::join!(
            self.production.load(true),
            self.measure_units.load(true),
            self.goals.load(true),
            self.sales.load(true),
            self.transactions.load(true),
        );
        let outcomes = [production, measure_units, goals, sales, transactions];
        info!("Info: sincronización inicial {:?}", outcomes);
        outcomes
    }
}
