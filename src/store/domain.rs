//! Estado y comandos del store paginado.
//!
//! `CollectionState` contiene sólo transiciones puras; la tarea del store
//! (`store::logic`) es su único escritor.


use tokio::sync::oneshot;
use crate::api::domain::{Cursor, Page, PageRequest};
use crate::entities::domain::Entity;


/// Vista paginada de una colección remota.
#[derive(Debug, Clone)]
pub struct CollectionState<E: Entity> {
    /// Registros en orden de carga.
    pub items: Vec<E>,
    pub loading: bool,
    pub has_more: bool,
    pub cursor: Option<Cursor>,
    pub filter: E::Filter,
}


impl<E: Entity> Default for CollectionState<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            has_more: true,
            cursor: None,
            filter: E::Filter::default(),
        }
    }
}


impl<E: Entity> CollectionState<E> {

    /// Reset con un filtro nuevo. El filtro del estado no cambia hasta que la carga
    /// termina.
    pub fn begin_filtered_load(&mut self, filter: &E::Filter, limit: u32) -> PageRequest<E::Filter> {
        self.loading = true;
        PageRequest {
            limit,
            cursor: None,
            filter: filter.clone(),
        }
    }

    /// Una carga incremental sólo procede si quedan páginas; un reset siempre procede.
    pub fn can_load(&self, reset: bool) -> bool {
        !self.loading && (reset || self.has_more)
    }

    /// Marca la carga en curso y arma la petición. El reset no envía cursor.
    pub fn begin_load(&mut self, reset: bool, limit: u32) -> PageRequest<E::Filter> {
        self.loading = true;
        PageRequest {
            limit,
            cursor: if reset { None } else { self.cursor.clone() },
            filter: self.filter.clone(),
        }
    }

    /// Aplica una página recibida: reemplaza (reset) o agrega al final (incremental).
    pub fn apply_page(&mut self, reset: bool, page: Page<E>) -> usize {
        let received = page.items.len();
        self.has_more = page.has_more;
        self.cursor = page.next_cursor;
        if reset {
            self.items = page.items;
        } else {
            self.items.extend(page.items);
        }
        self.loading = false;
        received
    }

    /// Una carga fallida detiene la paginación sin tocar los registros ya cargados.
    pub fn fail_load(&mut self) {
        self.has_more = false;
        self.loading = false;
    }

    /// La carga en curso fue abortada; la paginación queda como estaba.
    pub fn cancel_load(&mut self) {
        self.loading = false;
    }
}


/// Resultado de una solicitud de carga.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { received: usize },
    /// Ya había una operación en curso o no quedan páginas.
    Skipped,
    /// El error fue notificado al usuario; `has_more` quedó en `false`.
    Failed,
    Cancelled,
}


/// Mensajes que los handles envían a la tarea del store.
pub enum Command<E: Entity> {
    Load {
        reset: bool,
        reply: oneshot::Sender<LoadOutcome>,
    },
    Insert {
        payload: E::Insert,
        reply: oneshot::Sender<bool>,
    },
    Update {
        payload: E::Update,
        reply: oneshot::Sender<bool>,
    },
    SetFilter {
        filter: E::Filter,
        reply: oneshot::Sender<LoadOutcome>,
    },
    Cancel {
        reply: oneshot::Sender<bool>,
    },
}
