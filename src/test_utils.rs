//! Utilidades compartidas por los tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use tokio::sync::{mpsc, Semaphore};
use tracing_subscriber::EnvFilter;
use crate::api::domain::{Cursor, Page, PageRequest, RemoteCollection};
use crate::entities::domain::Entity;
use crate::entities::measure_unit::MeasureUnit;
use crate::events::logic::EventBus;
use crate::notification::domain::Notification;
use crate::notification::logic::Notifier;
use crate::store::logic::{start_store, StoreContext, StoreHandle};
use crate::system::domain::ErrorType;


pub(crate) const TEST_DEADLINE: Duration = Duration::from_secs(2);


pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}


pub(crate) fn unit(id: i64, name: &str) -> MeasureUnit {
    MeasureUnit {
        id,
        name: name.to_string(),
        abbreviation: name.chars().take(2).collect(),
    }
}


pub(crate) fn page<E>(items: Vec<E>, has_more: bool, cursor: Option<&str>) -> Page<E> {
    Page {
        items,
        has_more,
        next_cursor: cursor.map(Cursor::new),
    }
}


/// Vacía los avisos pendientes sin esperar.
pub(crate) fn drain(rx: &mut mpsc::Receiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        out.push(notification);
    }
    out
}


/// Espera activa (con tope de 2 s) hasta que `condition` se cumpla.
pub(crate) async fn wait_until<F: Fn() -> bool>(condition: F) {
    for _ in 0..400 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("la condición no se cumplió a tiempo");
}


/// Levanta un store sobre `fake` con su propio canal de avisos y bus de eventos.
pub(crate) fn spawn_store<E: Entity>(fake: &FakeRemote<E>,
                                     deadline: Duration) -> (StoreHandle<E>, mpsc::Receiver<Notification>, EventBus) {
    let (to_notifier, notes) = mpsc::channel(16);
    let events = EventBus::new();
    let ctx = StoreContext {
        notifier: Notifier::new(to_notifier),
        events: events.clone(),
        deadline,
    };
    let (to_store, from_handles) = mpsc::channel(8);
    let store = start_store(to_store, from_handles, fake.clone().into_remote(), ctx);
    (store, notes, events)
}


struct Script<E: Entity> {
    pages: VecDeque<Result<Page<E>, ErrorType>>,
    creates: VecDeque<Result<(), ErrorType>>,
    update_results: VecDeque<Result<(), ErrorType>>,
    requests: Vec<PageRequest<E::Filter>>,
    inserted: Vec<E::Insert>,
    updated: Vec<E::Update>,
    held: bool,
    writes_held: bool,
}


/// Colección remota en memoria con respuestas programadas.
///
/// Sin respuestas programadas, `list` devuelve una página vacía y final y las
/// mutaciones tienen éxito. Con `hold_lists`, cada `list` espera un permiso de `release`;
/// con `hold_writes`, cada escritura espera un permiso de `release_writes`.
pub(crate) struct FakeRemote<E: Entity> {
    script: Arc<Mutex<Script<E>>>,
    gate: Arc<Semaphore>,
    write_gate: Arc<Semaphore>,
}


impl<E: Entity> Clone for FakeRemote<E> {
    fn clone(&self) -> Self {
        Self {
            script: Arc::clone(&self.script),
            gate: Arc::clone(&self.gate),
            write_gate: Arc::clone(&self.write_gate),
        }
    }
}


impl<E: Entity> FakeRemote<E> {
    pub(crate) fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                pages: VecDeque::new(),
                creates: VecDeque::new(),
                update_results: VecDeque::new(),
                requests: Vec::new(),
                inserted: Vec::new(),
                updated: Vec::new(),
                held: false,
                writes_held: false,
            })),
            gate: Arc::new(Semaphore::new(0)),
            write_gate: Arc::new(Semaphore::new(0)),
        }
    }

    pub(crate) fn into_remote(self) -> Arc<dyn RemoteCollection<E>> {
        Arc::new(self)
    }

    pub(crate) fn push_page(&self, items: Vec<E>, has_more: bool, cursor: Option<&str>) {
        self.script.lock().unwrap().pages.push_back(Ok(page(items, has_more, cursor)));
    }

    pub(crate) fn fail_next_list(&self, error: ErrorType) {
        self.script.lock().unwrap().pages.push_back(Err(error));
    }

    pub(crate) fn fail_next_create(&self, error: ErrorType) {
        self.script.lock().unwrap().creates.push_back(Err(error));
    }

    pub(crate) fn fail_next_update(&self, error: ErrorType) {
        self.script.lock().unwrap().update_results.push_back(Err(error));
    }

    pub(crate) fn hold_lists(&self) {
        self.script.lock().unwrap().held = true;
    }

    pub(crate) fn release(&self, permits: usize) {
        self.gate.add_permits(permits);
    }

    pub(crate) fn hold_writes(&self) {
        self.script.lock().unwrap().writes_held = true;
    }

    pub(crate) fn release_writes(&self, permits: usize) {
        self.write_gate.add_permits(permits);
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.script.lock().unwrap().requests.len()
    }

    pub(crate) fn create_calls(&self) -> usize {
        self.script.lock().unwrap().inserted.len()
    }

    pub(crate) fn requests(&self) -> Vec<PageRequest<E::Filter>> {
        self.script.lock().unwrap().requests.clone()
    }

    pub(crate) fn last_request(&self) -> Option<PageRequest<E::Filter>> {
        self.script.lock().unwrap().requests.last().cloned()
    }

    pub(crate) fn inserts(&self) -> Vec<E::Insert> {
        self.script.lock().unwrap().inserted.clone()
    }

    pub(crate) fn updates(&self) -> Vec<E::Update> {
        self.script.lock().unwrap().updated.clone()
    }
}


#[async_trait]
impl<E: Entity> RemoteCollection<E> for FakeRemote<E> {
    async fn list(&self, request: PageRequest<E::Filter>) -> Result<Page<E>, ErrorType> {
        let held = {
            let mut script = self.script.lock().unwrap();
            script.requests.push(request);
            script.held
        };
        if held {
            self.gate.acquire().await.unwrap().forget();
        }
        self.script
            .lock()
            .unwrap()
            .pages
            .pop_front()
            .unwrap_or_else(|| Ok(page(Vec::new(), false, None)))
    }

    async fn create(&self, payload: E::Insert) -> Result<(), ErrorType> {
        let held = {
            let mut script = self.script.lock().unwrap();
            script.inserted.push(payload);
            script.writes_held
        };
        if held {
            self.write_gate.acquire().await.unwrap().forget();
        }
        self.script.lock().unwrap().creates.pop_front().unwrap_or(Ok(()))
    }

    async fn update(&self, payload: E::Update) -> Result<(), ErrorType> {
        let held = {
            let mut script = self.script.lock().unwrap();
            script.updated.push(payload);
            script.writes_held
        };
        if held {
            self.write_gate.acquire().await.unwrap().forget();
        }
        self.script.lock().unwrap().update_results.pop_front().unwrap_or(Ok(()))
    }
}
