//! Bus de eventos tipado (publicación/suscripción) para todo el proceso.
//!
//! El registro vive en un `DashMap` indexado por el `TypeId` del evento. `subscribe`
//! devuelve una `Subscription`: mientras exista, el handler recibe los eventos; al
//! liberarla el handler se desregistra. Así la vida del handler queda atada a la del
//! componente que lo creó.


use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, trace, warn};
use super::domain::{CollectionSynced, EntitySaved, Event, LoadFailed, Operation};


type Handler = Arc<dyn Fn(&dyn Any) + Send + Sync>;


#[derive(Default)]
struct Registry {
    handlers: DashMap<TypeId, Vec<(u64, Handler)>>,
    next_id: AtomicU64,
}


#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Registry>,
}


impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("event_types", &self.registry.handlers.len())
            .finish()
    }
}


impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra `handler` para el evento `E`.
    pub fn subscribe<E, F>(&self, handler: F) -> Subscription
    where
        E: Event,
        F: Fn(&E::Payload) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        let erased: Handler = Arc::new(move |payload: &dyn Any| {
            if let Some(payload) = payload.downcast_ref::<E::Payload>() {
                handler(payload);
            }
        });

        self.registry
            .handlers
            .entry(TypeId::of::<E>())
            .or_default()
            .push((id, erased));

        debug!("Debug: suscripción {} a {}", id, E::NAME);

        Subscription {
            registry: Arc::downgrade(&self.registry),
            event: TypeId::of::<E>(),
            name: E::NAME,
            id,
        }
    }

    /// Reenvía los eventos `E` a un canal, para consumirlos desde una tarea asíncrona.
    pub fn listen<E: Event>(&self, capacity: usize) -> Listener<E> {
        let (tx, rx) = mpsc::channel(capacity);
        let subscription = self.subscribe::<E, _>(move |payload| {
            if let Err(TrySendError::Full(_)) = tx.try_send(payload.clone()) {
                warn!("Warning: listener de {} saturado, evento descartado", E::NAME);
            }
        });
        Listener { rx, _subscription: subscription }
    }

    /// Entrega `payload` a todos los suscriptores de `E`. Devuelve cuántos lo recibieron.
    pub fn emit<E: Event>(&self, payload: E::Payload) -> usize {
        // Los handlers se copian fuera del mapa: un handler puede suscribir o desuscribir.
        let handlers: Vec<Handler> = self
            .registry
            .handlers
            .get(&TypeId::of::<E>())
            .map(|entry| entry.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();

        trace!("Trace: emitiendo {} a {} suscriptores", E::NAME, handlers.len());

        for handler in &handlers {
            handler(&payload);
        }
        handlers.len()
    }

    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.registry
            .handlers
            .get(&TypeId::of::<E>())
            .map(|entry| entry.len())
            .unwrap_or(0)
    }
}


/// Registro activo de un handler. Liberarla equivale a desuscribirse.
#[must_use = "el handler se desregistra al liberar la suscripción"]
pub struct Subscription {
    registry: Weak<Registry>,
    event: TypeId,
    name: &'static str,
    id: u64,
}


impl Subscription {
    pub fn unsubscribe(self) {}
}


impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        if let Some(mut entry) = registry.handlers.get_mut(&self.event) {
            entry.retain(|(id, _)| *id != self.id);
        }
        debug!("Debug: suscripción {} a {} liberada", self.id, self.name);
    }
}


/// Receptor asíncrono de eventos `E`; mantiene viva su suscripción.
pub struct Listener<E: Event> {
    rx: mpsc::Receiver<E::Payload>,
    _subscription: Subscription,
}


impl<E: Event> Listener<E> {
    pub async fn recv(&mut self) -> Option<E::Payload> {
        self.rx.recv().await
    }
}


/// Tarea que deja en los logs la actividad de todas las colecciones.
pub fn start_event_log(bus: &EventBus) {
    let mut synced = bus.listen::<CollectionSynced>(64);
    let mut saved = bus.listen::<EntitySaved>(64);
    let mut failed = bus.listen::<LoadFailed>(64);

    tokio::spawn(async move {
        info!("Info: event log task creada");
        loop {
            tokio::select! {
                Some(s) = synced.recv() => {
                    info!("Info: {} sincronizada, {} registros (más páginas: {})", s.collection, s.items, s.has_more);
                }
                Some(s) = saved.recv() => {
                    info!("Info: {} guardado en {}", match s.operation {
                        Operation::Insert => "alta",
                        Operation::Update => "edición",
                    }, s.collection);
                }
                Some(f) = failed.recv() => {
                    warn!("Warning: carga de {} fallida (timeout: {})", f.collection, f.timed_out);
                }
                else => break,
            }
        }
        info!("Info: event log task finalizada");
    });
}
