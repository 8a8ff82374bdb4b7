//! Store paginado genérico (un actor por colección).
//!
//! La tarea del store es el único escritor de `CollectionState`. Los handles le envían
//! comandos por un canal MPSC y observan el estado por un canal `watch`.
//!
//! # Modelo de ejecución
//! 1. Como máximo hay una petición remota en curso (`in_flight`).
//! 2. Mientras hay una petición en curso, los comandos se siguen atendiendo: una nueva
//!    carga se responde como `Skipped`; inserciones, actualizaciones y cambios de filtro
//!    se encolan (`backlog`) y se ejecutan en orden cuando el store queda libre.
//!    Cualquier petición en curso bloquea las cargas, también una escritura: en ese caso
//!    se omite la carga aunque el estado publicado tenga `loading == false`.
//! 3. Un cambio de filtro sólo se escribe en el estado cuando su carga termina; si se
//!    cancela, el store conserva el filtro, los registros y el cursor anteriores.
//! 4. Cada mutación exitosa ejecuta exactamente un reset-reload antes de confirmar.
//! 5. Toda petición tiene un plazo (`deadline`); al vencer se limpia `loading` y se
//!    emite un aviso de timeout.


use std::collections::VecDeque;
use std::future::{poll_fn, Future};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, error, info, instrument, warn};
use crate::api::domain::{Page, RemoteCollection};
use crate::entities::domain::Entity;
use crate::events::domain::{CollectionSynced, EntitySaved, Failed, LoadFailed, Operation, Saved, Synced};
use crate::events::logic::EventBus;
use crate::notification::logic::Notifier;
use crate::system::domain::ErrorType;
use super::domain::{CollectionState, Command, LoadOutcome};


type Job<T> = Pin<Box<dyn Future<Output = Result<T, ErrorType>> + Send>>;


/// Colaboradores compartidos por todos los stores.
#[derive(Clone, Debug)]
pub struct StoreContext {
    pub notifier: Notifier,
    pub events: EventBus,
    pub deadline: Duration,
}


/// Mutación confirmada por el servidor, a la espera de su reset-reload.
struct WriteDone {
    operation: Operation,
    reply: oneshot::Sender<bool>,
}


enum InFlight<E: Entity> {
    Load {
        job: Job<Page<E>>,
        reset: bool,
        reply: Option<oneshot::Sender<LoadOutcome>>,
        after_write: Option<WriteDone>,
        /// Filtro nuevo; se confirma en el estado cuando la carga termina.
        filter: Option<E::Filter>,
    },
    Write {
        job: Job<()>,
        operation: Operation,
        reply: oneshot::Sender<bool>,
    },
}


enum Done<E: Entity> {
    Load {
        result: Result<Page<E>, ErrorType>,
        reset: bool,
        reply: Option<oneshot::Sender<LoadOutcome>>,
        after_write: Option<WriteDone>,
        filter: Option<E::Filter>,
    },
    Write {
        result: Result<(), ErrorType>,
        operation: Operation,
        reply: oneshot::Sender<bool>,
    },
}


enum Queued<E: Entity> {
    Insert { payload: E::Insert, reply: oneshot::Sender<bool> },
    Update { payload: E::Update, reply: oneshot::Sender<bool> },
    SetFilter { filter: E::Filter, reply: oneshot::Sender<LoadOutcome> },
}


struct StoreTask<E: Entity> {
    remote: Arc<dyn RemoteCollection<E>>,
    ctx: StoreContext,
    state: CollectionState<E>,
    publisher: watch::Sender<CollectionState<E>>,
    in_flight: Option<InFlight<E>>,
    backlog: VecDeque<Queued<E>>,
}


impl<E: Entity> StoreTask<E> {

    #[instrument(name = "store_task", skip_all, fields(collection = %E::config().kind))]
    async fn run(mut self, mut from_handles: mpsc::Receiver<Command<E>>) {
        info!("Info: store task creada");

        loop {
            tokio::select! {
                command = from_handles.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                done = poll_fn(|cx| poll_in_flight(&mut self.in_flight, cx)) => {
                    self.finish(done);
                    self.start_next();
                }
            }
        }

        info!("Info: store task finalizada");
    }

    fn handle(&mut self, command: Command<E>) {
        match command {
            Command::Load { reset, reply } => {
                if self.in_flight.is_some() || !self.state.can_load(reset) {
                    debug!("Debug: carga omitida (reset={})", reset);
                    let _ = reply.send(LoadOutcome::Skipped);
                } else {
                    self.start_load(reset, Some(reply), None);
                }
            }
            Command::Insert { payload, reply } => self.enqueue(Queued::Insert { payload, reply }),
            Command::Update { payload, reply } => self.enqueue(Queued::Update { payload, reply }),
            Command::SetFilter { filter, reply } => self.enqueue(Queued::SetFilter { filter, reply }),
            Command::Cancel { reply } => {
                let cancelled = self.cancel();
                let _ = reply.send(cancelled);
                self.start_next();
            }
        }
    }

    fn enqueue(&mut self, queued: Queued<E>) {
        self.backlog.push_back(queued);
        self.start_next();
    }

    /// Arranca la siguiente operación encolada si el store está libre.
    fn start_next(&mut self) {
        if self.in_flight.is_some() {
            return;
        }
        let Some(queued) = self.backlog.pop_front() else {
            return;
        };

        let remote = Arc::clone(&self.remote);
        let deadline = self.ctx.deadline;

        match queued {
            Queued::Insert { payload, reply } => {
                self.in_flight = Some(InFlight::Write {
                    job: Box::pin(async move { with_deadline(deadline, remote.create(payload)).await }),
                    operation: Operation::Insert,
                    reply,
                });
            }
            Queued::Update { payload, reply } => {
                self.in_flight = Some(InFlight::Write {
                    job: Box::pin(async move { with_deadline(deadline, remote.update(payload)).await }),
                    operation: Operation::Update,
                    reply,
                });
            }
            Queued::SetFilter { filter, reply } => {
                let request = self.state.begin_filtered_load(&filter, E::config().page_limit);
                self.publish();
                self.in_flight = Some(InFlight::Load {
                    job: Box::pin(async move { with_deadline(deadline, remote.list(request)).await }),
                    reset: true,
                    reply: Some(reply),
                    after_write: None,
                    filter: Some(filter),
                });
            }
        }
    }

    fn start_load(&mut self,
                  reset: bool,
                  reply: Option<oneshot::Sender<LoadOutcome>>,
                  after_write: Option<WriteDone>) {

        let request = self.state.begin_load(reset, E::config().page_limit);
        self.publish();

        let remote = Arc::clone(&self.remote);
        let deadline = self.ctx.deadline;
        self.in_flight = Some(InFlight::Load {
            job: Box::pin(async move { with_deadline(deadline, remote.list(request)).await }),
            reset,
            reply,
            after_write,
            filter: None,
        });
    }

    fn finish(&mut self, done: Done<E>) {
        match done {
            Done::Load { result, reset, reply, after_write, filter } => {
                if let Some(filter) = filter {
                    self.state.filter = filter;
                }
                let outcome = self.finish_load(reset, result);
                if let Some(reply) = reply {
                    let _ = reply.send(outcome);
                }
                if let Some(write) = after_write {
                    self.confirm_write(write);
                }
            }
            Done::Write { result: Ok(()), operation, reply } => {
                self.start_load(true, None, Some(WriteDone { operation, reply }));
            }
            Done::Write { result: Err(e), operation, reply } => {
                let messages = E::config().messages;
                let message = match operation {
                    Operation::Insert => messages.insert_error,
                    Operation::Update => messages.update_error,
                };
                error!("Error: {:?} rechazado: {}", operation, e);
                self.report(&e, message);
                let _ = reply.send(false);
            }
        }
    }

    fn finish_load(&mut self, reset: bool, result: Result<Page<E>, ErrorType>) -> LoadOutcome {
        let config = E::config();
        match result {
            Ok(page) => {
                let received = self.state.apply_page(reset, page);
                self.publish();
                info!("Info: {} registros recibidos, total {}", received, self.state.items.len());
                if reset {
                    self.ctx.events.emit::<CollectionSynced>(Synced {
                        collection: config.kind,
                        items: self.state.items.len(),
                        has_more: self.state.has_more,
                    });
                }
                LoadOutcome::Loaded { received }
            }
            Err(e) => {
                error!("Error: fallo la carga (reset={}): {}", reset, e);
                self.state.fail_load();
                self.publish();
                self.report(&e, config.messages.load_error);
                self.ctx.events.emit::<LoadFailed>(Failed {
                    collection: config.kind,
                    timed_out: e.is_timeout(),
                });
                LoadOutcome::Failed
            }
        }
    }

    fn confirm_write(&self, write: WriteDone) {
        let config = E::config();
        let message = match write.operation {
            Operation::Insert => config.messages.insert_success,
            Operation::Update => config.messages.update_success,
        };
        self.ctx.notifier.success(message);
        self.ctx.events.emit::<EntitySaved>(Saved {
            collection: config.kind,
            operation: write.operation,
        });
        let _ = write.reply.send(true);
    }

    /// Aborta la petición en curso. Los registros cargados no se modifican y un cambio de
    /// filtro pendiente se descarta.
    fn cancel(&mut self) -> bool {
        match self.in_flight.take() {
            None => false,
            Some(InFlight::Load { reply, after_write, .. }) => {
                warn!("Warning: carga cancelada");
                self.state.cancel_load();
                self.publish();
                if let Some(reply) = reply {
                    let _ = reply.send(LoadOutcome::Cancelled);
                }
                // La mutación ya fue aceptada por el servidor; sólo se abortó el reload.
                if let Some(write) = after_write {
                    self.confirm_write(write);
                }
                true
            }
            Some(InFlight::Write { operation, reply, .. }) => {
                warn!("Warning: {:?} cancelado", operation);
                let _ = reply.send(false);
                true
            }
        }
    }

    fn report(&self, error: &ErrorType, message: &str) {
        if error.is_timeout() {
            self.ctx.notifier.timeout(E::config().messages.timeout);
        } else {
            self.ctx.notifier.error(message);
        }
    }

    fn publish(&self) {
        self.publisher.send_replace(self.state.clone());
    }
}


/// Sondea la petición en curso sin perder su contexto: al completarse, el resultado sale
/// junto con quien lo espera; mientras tanto se devuelve a su lugar.
fn poll_in_flight<E: Entity>(slot: &mut Option<InFlight<E>>, cx: &mut Context<'_>) -> Poll<Done<E>> {
    match slot.take() {
        None => Poll::Pending,
        Some(InFlight::Load { mut job, reset, reply, after_write, filter }) => match job.as_mut().poll(cx) {
            Poll::Ready(result) => Poll::Ready(Done::Load { result, reset, reply, after_write, filter }),
            Poll::Pending => {
                *slot = Some(InFlight::Load { job, reset, reply, after_write, filter });
                Poll::Pending
            }
        },
        Some(InFlight::Write { mut job, operation, reply }) => match job.as_mut().poll(cx) {
            Poll::Ready(result) => Poll::Ready(Done::Write { result, operation, reply }),
            Poll::Pending => {
                *slot = Some(InFlight::Write { job, operation, reply });
                Poll::Pending
            }
        },
    }
}


async fn with_deadline<T, F>(deadline: Duration, request: F) -> Result<T, ErrorType>
where
    F: Future<Output = Result<T, ErrorType>>,
{
    match tokio::time::timeout(deadline, request).await {
        Ok(result) => result,
        Err(_) => Err(ErrorType::Timeout(deadline)),
    }
}


/// Acceso de lectura/escritura a un store. Clonable; todas las copias hablan con la
/// misma tarea.
pub struct StoreHandle<E: Entity> {
    commands: mpsc::Sender<Command<E>>,
    state: watch::Receiver<CollectionState<E>>,
}


impl<E: Entity> Clone for StoreHandle<E> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            state: self.state.clone(),
        }
    }
}


impl<E: Entity> StoreHandle<E> {

    /// Carga una página. Los errores se notifican al usuario y nunca se propagan.
    pub async fn load(&self, reset: bool) -> LoadOutcome {
        let (reply, rx) = oneshot::channel();
        if !self.send(Command::Load { reset, reply }).await {
            return LoadOutcome::Failed;
        }
        rx.await.unwrap_or(LoadOutcome::Cancelled)
    }

    /// Crea un registro y resincroniza la colección. `true` si el servidor lo aceptó.
    pub async fn insert(&self, payload: E::Insert) -> bool {
        let (reply, rx) = oneshot::channel();
        if !self.send(Command::Insert { payload, reply }).await {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    /// Actualiza un registro y resincroniza la colección. `true` si el servidor lo aceptó.
    pub async fn update(&self, payload: E::Update) -> bool {
        let (reply, rx) = oneshot::channel();
        if !self.send(Command::Update { payload, reply }).await {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    /// Reemplaza el filtro de listado y recarga desde la primera página.
    pub async fn set_filter(&self, filter: E::Filter) -> LoadOutcome {
        let (reply, rx) = oneshot::channel();
        if !self.send(Command::SetFilter { filter, reply }).await {
            return LoadOutcome::Failed;
        }
        rx.await.unwrap_or(LoadOutcome::Cancelled)
    }

    /// Aborta la petición en curso, si la hay.
    pub async fn cancel(&self) -> bool {
        let (reply, rx) = oneshot::channel();
        if !self.send(Command::Cancel { reply }).await {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    pub fn snapshot(&self) -> CollectionState<E> {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn subscribe(&self) -> watch::Receiver<CollectionState<E>> {
        self.state.clone()
    }

    pub fn changes(&self) -> WatchStream<CollectionState<E>> {
        WatchStream::new(self.state.clone())
    }

    async fn send(&self, command: Command<E>) -> bool {
        if self.commands.send(command).await.is_err() {
            error!("Error: el store {} no está activo", E::config().kind);
            return false;
        }
        true
    }
}


/// Inicia la tarea del store y devuelve su handle.
///
/// # Argumentos
/// * `to_store` / `from_handles`: extremos del canal de comandos.
/// * `remote`: servicio remoto de la colección.
/// * `ctx`: avisos, bus de eventos y plazo por petición.
pub fn start_store<E: Entity>(to_store: mpsc::Sender<Command<E>>,
                              from_handles: mpsc::Receiver<Command<E>>,
                              remote: Arc<dyn RemoteCollection<E>>,
                              ctx: StoreContext) -> StoreHandle<E> {

    info!("Info: iniciando store {}", E::config().kind);

    let (publisher, state) = watch::channel(CollectionState::default());
    let task = StoreTask {
        remote,
        ctx,
        state: CollectionState::default(),
        publisher,
        in_flight: None,
        backlog: VecDeque::new(),
    };

    tokio::spawn(async move {
        task.run(from_handles).await;
    });

    StoreHandle { commands: to_store, state }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;
    use crate::entities::goal::{Goal, GoalFilter, GoalKindFilter, GoalStatusFilter};
    use crate::entities::measure_unit::{MeasureUnit, MeasureUnitInsert, MeasureUnitUpdate};
    use crate::events::domain::CollectionSynced;
    use crate::notification::domain::{Notification, Severity};
    use crate::test_utils::{
        FakeRemote, drain, init_test_tracing, spawn_store, unit, wait_until, TEST_DEADLINE,
    };

    fn new_unit() -> MeasureUnitInsert {
        MeasureUnitInsert { name: "Litro".into(), abbreviation: "L".into() }
    }

    #[tokio::test]
    async fn reset_then_incremental_scenario() {
        init_test_tracing();
        let fake = FakeRemote::<MeasureUnit>::new();
        fake.push_page(vec![unit(1, "A"), unit(2, "B")], true, Some("B"));
        fake.push_page(vec![unit(3, "C")], false, Some("C"));
        let (store, _notes, _bus) = spawn_store(&fake, TEST_DEADLINE);

        assert_eq!(store.load(true).await, LoadOutcome::Loaded { received: 2 });
        let state = store.snapshot();
        assert_eq!(state.items, vec![unit(1, "A"), unit(2, "B")]);
        assert!(state.has_more);
        assert_eq!(state.cursor.as_ref().map(|c| c.as_str()), Some("B"));

        assert_eq!(store.load(false).await, LoadOutcome::Loaded { received: 1 });
        let state = store.snapshot();
        assert_eq!(state.items, vec![unit(1, "A"), unit(2, "B"), unit(3, "C")]);
        assert!(!state.has_more);

        let requests = fake.requests();
        assert!(requests[0].cursor.is_none());
        assert_eq!(requests[1].cursor.as_ref().map(|c| c.as_str()), Some("B"));
        assert_eq!(requests[0].limit, 15);
    }

    #[tokio::test]
    async fn load_while_loading_is_a_no_op() {
        init_test_tracing();
        let fake = FakeRemote::<MeasureUnit>::new();
        fake.hold_lists();
        fake.push_page(vec![unit(1, "A")], true, Some("A"));
        let (store, _notes, _bus) = spawn_store(&fake, Duration::from_secs(5));

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.load(true).await }
        });
        wait_until(|| fake.list_calls() == 1).await;
        assert!(store.is_loading());

        assert_eq!(store.load(false).await, LoadOutcome::Skipped);
        assert_eq!(store.load(true).await, LoadOutcome::Skipped);
        assert_eq!(fake.list_calls(), 1);

        fake.release(1);
        assert_eq!(first.await.unwrap(), LoadOutcome::Loaded { received: 1 });
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn exhausted_collection_skips_incremental_but_allows_reset() {
        init_test_tracing();
        let fake = FakeRemote::<MeasureUnit>::new();
        fake.push_page(vec![unit(1, "A")], false, Some("A"));
        fake.push_page(vec![unit(9, "Z")], false, Some("Z"));
        let (store, _notes, _bus) = spawn_store(&fake, TEST_DEADLINE);

        store.load(true).await;
        assert_eq!(store.load(false).await, LoadOutcome::Skipped);
        assert_eq!(store.load(true).await, LoadOutcome::Loaded { received: 1 });
        assert_eq!(store.snapshot().items, vec![unit(9, "Z")]);
        assert_eq!(fake.list_calls(), 2);
    }

    #[tokio::test]
    async fn failed_load_keeps_items_and_stops_pagination() {
        init_test_tracing();
        let fake = FakeRemote::<MeasureUnit>::new();
        fake.push_page(vec![unit(1, "A")], true, Some("A"));
        fake.fail_next_list(ErrorType::Status { status: 502, body: String::new() });
        let (store, mut notes, _bus) = spawn_store(&fake, TEST_DEADLINE);

        store.load(true).await;
        assert_eq!(store.load(false).await, LoadOutcome::Failed);

        let state = store.snapshot();
        assert_eq!(state.items, vec![unit(1, "A")]);
        assert!(!state.has_more);
        assert!(!state.loading);
        assert_eq!(
            drain(&mut notes),
            vec![Notification::error("Erro ao carregar unidades de medida.")]
        );

        assert_eq!(store.load(false).await, LoadOutcome::Skipped);
        assert_eq!(fake.list_calls(), 2);
    }

    #[tokio::test]
    async fn insert_success_reloads_exactly_once() {
        init_test_tracing();
        let fake = FakeRemote::<MeasureUnit>::new();
        fake.push_page(vec![unit(1, "A")], true, Some("A"));
        fake.push_page(vec![unit(2, "Litro"), unit(1, "A")], false, Some("A"));
        let (store, mut notes, bus) = spawn_store(&fake, TEST_DEADLINE);
        let mut synced = bus.listen::<CollectionSynced>(8);

        store.load(true).await;
        assert!(store.insert(new_unit()).await);

        assert_eq!(fake.create_calls(), 1);
        assert_eq!(fake.list_calls(), 2);
        assert!(fake.requests()[1].cursor.is_none());
        assert_eq!(store.snapshot().items, vec![unit(2, "Litro"), unit(1, "A")]);
        assert_eq!(
            drain(&mut notes),
            vec![Notification::success("Unidade de medida adicionada com sucesso.")]
        );
        assert_eq!(synced.recv().await.map(|s| s.items), Some(1));
        assert_eq!(synced.recv().await.map(|s| s.items), Some(2));
    }

    #[tokio::test]
    async fn insert_failure_returns_false_without_reload() {
        init_test_tracing();
        let fake = FakeRemote::<MeasureUnit>::new();
        fake.push_page(vec![unit(1, "A")], true, Some("A"));
        fake.fail_next_create(ErrorType::Status { status: 400, body: "duplicado".into() });
        let (store, mut notes, _bus) = spawn_store(&fake, TEST_DEADLINE);

        store.load(true).await;
        assert!(!store.insert(new_unit()).await);

        assert_eq!(fake.list_calls(), 1);
        assert_eq!(store.snapshot().items, vec![unit(1, "A")]);
        assert_eq!(
            drain(&mut notes),
            vec![Notification::error("Erro ao adicionar unidade de medida.")]
        );
    }

    #[tokio::test]
    async fn update_success_reloads_and_reports() {
        init_test_tracing();
        let fake = FakeRemote::<MeasureUnit>::new();
        fake.push_page(vec![unit(1, "Kilo")], false, Some("1"));
        let (store, mut notes, _bus) = spawn_store(&fake, TEST_DEADLINE);

        let update = MeasureUnitUpdate { id: 1, fields: new_unit() };
        assert!(store.update(update.clone()).await);

        assert_eq!(fake.updates(), vec![update]);
        assert_eq!(fake.list_calls(), 1);
        assert_eq!(store.snapshot().items, vec![unit(1, "Kilo")]);
        assert_eq!(
            drain(&mut notes),
            vec![Notification::success("Unidade de medida atualizada com sucesso.")]
        );
    }

    #[tokio::test]
    async fn mutation_waits_for_in_flight_load_and_still_reloads() {
        init_test_tracing();
        let fake = FakeRemote::<MeasureUnit>::new();
        fake.hold_lists();
        fake.push_page(vec![unit(1, "A")], true, Some("A"));
        fake.push_page(vec![unit(2, "Litro"), unit(1, "A")], false, None);
        let (store, _notes, _bus) = spawn_store(&fake, Duration::from_secs(5));

        let load = tokio::spawn({
            let store = store.clone();
            async move { store.load(true).await }
        });
        wait_until(|| fake.list_calls() == 1).await;

        let insert = tokio::spawn({
            let store = store.clone();
            async move { store.insert(new_unit()).await }
        });
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(fake.create_calls(), 0);

        fake.release(2);
        assert_eq!(load.await.unwrap(), LoadOutcome::Loaded { received: 1 });
        assert!(insert.await.unwrap());

        assert_eq!(fake.create_calls(), 1);
        assert_eq!(fake.list_calls(), 2);
        assert_eq!(store.snapshot().items, vec![unit(2, "Litro"), unit(1, "A")]);
    }

    #[tokio::test]
    async fn timeout_clears_loading_and_notifies() {
        init_test_tracing();
        let fake = FakeRemote::<MeasureUnit>::new();
        fake.hold_lists();
        let (store, mut notes, _bus) = spawn_store(&fake, Duration::from_millis(40));

        assert_eq!(store.load(true).await, LoadOutcome::Failed);

        let state = store.snapshot();
        assert!(!state.loading);
        assert!(!state.has_more);
        let notes = drain(&mut notes);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Timeout);
    }

    #[tokio::test]
    async fn cancel_aborts_in_flight_load() {
        init_test_tracing();
        let fake = FakeRemote::<MeasureUnit>::new();
        fake.push_page(vec![unit(1, "A")], true, Some("A"));
        let (store, mut notes, _bus) = spawn_store(&fake, Duration::from_secs(5));
        store.load(true).await;

        fake.hold_lists();
        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.load(false).await }
        });
        wait_until(|| fake.list_calls() == 2).await;

        assert!(store.cancel().await);
        assert_eq!(pending.await.unwrap(), LoadOutcome::Cancelled);

        let state = store.snapshot();
        assert!(!state.loading);
        assert!(state.has_more);
        assert_eq!(state.items, vec![unit(1, "A")]);
        assert!(drain(&mut notes).is_empty());
        assert!(!store.cancel().await);
    }

    #[tokio::test]
    async fn filter_change_resets_with_new_criteria() {
        init_test_tracing();
        let fake = FakeRemote::<Goal>::new();
        let (store, _notes, _bus) = spawn_store(&fake, TEST_DEADLINE);

        let filter = GoalFilter { kind: GoalKindFilter::Production, status: GoalStatusFilter::Reached };
        assert_eq!(store.set_filter(filter.clone()).await, LoadOutcome::Loaded { received: 0 });

        assert_eq!(store.snapshot().filter, filter);
        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].filter, filter);
        assert!(requests[0].cursor.is_none());
    }

    #[tokio::test]
    async fn watchers_see_published_states() {
        init_test_tracing();
        let fake = FakeRemote::<MeasureUnit>::new();
        fake.push_page(vec![unit(1, "A")], false, None);
        let (store, _notes, _bus) = spawn_store(&fake, TEST_DEADLINE);
        let mut changes = store.changes();

        let initial = changes.next().await.unwrap();
        assert!(initial.items.is_empty());

        store.load(true).await;
        let mut latest = changes.next().await.unwrap();
        while latest.loading {
            latest = changes.next().await.unwrap();
        }
        assert_eq!(latest.items, vec![unit(1, "A")]);
    }

    #[tokio::test]
    async fn cancelled_filter_change_keeps_previous_view() {
        init_test_tracing();
        let fake = FakeRemote::<Goal>::new();
        fake.push_page(Vec::new(), true, Some("OLD-CURSOR"));
        let (store, _notes, _bus) = spawn_store(&fake, Duration::from_secs(5));
        store.load(true).await;

        fake.hold_lists();
        let filter = GoalFilter { kind: GoalKindFilter::Production, status: GoalStatusFilter::Reached };
        let change = tokio::spawn({
            let store = store.clone();
            let filter = filter.clone();
            async move { store.set_filter(filter).await }
        });
        wait_until(|| fake.list_calls() == 2).await;
        assert_eq!(fake.requests()[1].filter, filter);

        assert!(store.cancel().await);
        assert_eq!(change.await.unwrap(), LoadOutcome::Cancelled);

        let state = store.snapshot();
        assert_eq!(state.filter, GoalFilter::default());
        assert_eq!(state.cursor.as_ref().map(|c| c.as_str()), Some("OLD-CURSOR"));
        assert!(state.has_more);

        fake.release(1);
        assert_eq!(store.load(false).await, LoadOutcome::Loaded { received: 0 });
        let next = fake.last_request().unwrap();
        assert_eq!(next.filter, GoalFilter::default());
        assert_eq!(next.cursor.as_ref().map(|c| c.as_str()), Some("OLD-CURSOR"));
    }

    #[tokio::test]
    async fn filter_change_waits_behind_in_flight_load() {
        init_test_tracing();
        let fake = FakeRemote::<Goal>::new();
        fake.hold_lists();
        let (store, _notes, _bus) = spawn_store(&fake, Duration::from_secs(5));

        let load = tokio::spawn({
            let store = store.clone();
            async move { store.load(true).await }
        });
        wait_until(|| fake.list_calls() == 1).await;

        let filter = GoalFilter { kind: GoalKindFilter::Sale, status: GoalStatusFilter::InProgress };
        let change = tokio::spawn({
            let store = store.clone();
            let filter = filter.clone();
            async move { store.set_filter(filter).await }
        });
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(fake.list_calls(), 1);
        assert_eq!(store.snapshot().filter, GoalFilter::default());

        fake.release(2);
        assert_eq!(load.await.unwrap(), LoadOutcome::Loaded { received: 0 });
        assert_eq!(change.await.unwrap(), LoadOutcome::Loaded { received: 0 });

        let requests = fake.requests();
        assert_eq!(requests[0].filter, GoalFilter::default());
        assert_eq!(requests[1].filter, filter);
        assert!(requests[1].cursor.is_none());
        assert_eq!(store.snapshot().filter, filter);
    }

    #[tokio::test]
    async fn update_failure_returns_false_without_reload() {
        init_test_tracing();
        let fake = FakeRemote::<MeasureUnit>::new();
        fake.fail_next_update(ErrorType::Status { status: 500, body: String::new() });
        let (store, mut notes, _bus) = spawn_store(&fake, TEST_DEADLINE);

        assert!(!store.update(MeasureUnitUpdate { id: 1, fields: new_unit() }).await);

        assert_eq!(fake.list_calls(), 0);
        assert_eq!(
            drain(&mut notes),
            vec![Notification::error("Erro ao atualizar unidade de medida.")]
        );
    }

    #[tokio::test]
    async fn failed_reload_after_insert_still_confirms_write() {
        init_test_tracing();
        let fake = FakeRemote::<MeasureUnit>::new();
        fake.fail_next_list(ErrorType::Status { status: 503, body: String::new() });
        let (store, mut notes, _bus) = spawn_store(&fake, TEST_DEADLINE);

        assert!(store.insert(new_unit()).await);

        assert_eq!(fake.list_calls(), 1);
        assert!(!store.snapshot().has_more);
        assert_eq!(
            drain(&mut notes),
            vec![
                Notification::error("Erro ao carregar unidades de medida."),
                Notification::success("Unidade de medida adicionada com sucesso."),
            ]
        );
    }

    #[tokio::test]
    async fn cancelled_write_answers_false_silently() {
        init_test_tracing();
        let fake = FakeRemote::<MeasureUnit>::new();
        fake.hold_writes();
        let (store, mut notes, _bus) = spawn_store(&fake, Duration::from_secs(5));

        let insert = tokio::spawn({
            let store = store.clone();
            async move { store.insert(new_unit()).await }
        });
        wait_until(|| fake.create_calls() == 1).await;

        assert!(store.cancel().await);
        assert!(!insert.await.unwrap());
        assert_eq!(fake.list_calls(), 0);
        assert!(drain(&mut notes).is_empty());
    }

    #[tokio::test]
    async fn cancelled_reload_after_write_still_confirms_it() {
        init_test_tracing();
        let fake = FakeRemote::<MeasureUnit>::new();
        fake.hold_lists();
        let (store, mut notes, _bus) = spawn_store(&fake, Duration::from_secs(5));

        let insert = tokio::spawn({
            let store = store.clone();
            async move { store.insert(new_unit()).await }
        });
        wait_until(|| fake.list_calls() == 1).await;

        assert!(store.cancel().await);
        assert!(insert.await.unwrap());
        assert!(!store.is_loading());
        assert_eq!(
            drain(&mut notes),
            vec![Notification::success("Unidade de medida adicionada com sucesso.")]
        );
    }

    #[tokio::test]
    async fn write_timeout_notifies_without_reload() {
        init_test_tracing();
        let fake = FakeRemote::<MeasureUnit>::new();
        fake.hold_writes();
        let (store, mut notes, _bus) = spawn_store(&fake, Duration::from_millis(40));

        assert!(!store.insert(new_unit()).await);

        assert_eq!(fake.list_calls(), 0);
        let notes = drain(&mut notes);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Timeout);
    }

    #[tokio::test]
    async fn load_during_write_is_skipped() {
        init_test_tracing();
        let fake = FakeRemote::<MeasureUnit>::new();
        fake.hold_writes();
        let (store, _notes, _bus) = spawn_store(&fake, Duration::from_secs(5));

        let insert = tokio::spawn({
            let store = store.clone();
            async move { store.insert(new_unit()).await }
        });
        wait_until(|| fake.create_calls() == 1).await;

        assert!(!store.is_loading());
        assert_eq!(store.load(true).await, LoadOutcome::Skipped);
        assert_eq!(fake.list_calls(), 0);

        fake.release_writes(1);
        assert!(insert.await.unwrap());
        assert_eq!(fake.list_calls(), 1);
    }

    #[tokio::test]
    async fn closed_store_fails_softly() {
        let (tx, rx) = mpsc::channel::<Command<MeasureUnit>>(1);
        drop(rx);
        let (_publisher, state) = watch::channel(CollectionState::default());
        let store = StoreHandle { commands: tx, state };

        assert_eq!(store.load(true).await, LoadOutcome::Failed);
        assert!(!store.insert(new_unit()).await);
        assert!(!store.cancel().await);
    }
}
