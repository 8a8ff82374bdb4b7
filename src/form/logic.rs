//! Enlace entre un formulario y el store de su colección.
//!
//! Valida antes de enviar, impide envíos simultáneos del mismo formulario y mantiene
//! el overlay de carga visible mientras dura la operación.


use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};
use crate::entities::domain::Entity;
use crate::loading::logic::LoadingOverlay;
use crate::store::logic::StoreHandle;
use super::domain::{SubmitOutcome, Validate};


pub struct FormBinding<E: Entity> {
    store: StoreHandle<E>,
    overlay: LoadingOverlay,
    submitting: AtomicBool,
}


struct Submitting<'a>(&'a AtomicBool);


impl Drop for Submitting<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}


impl<E: Entity> FormBinding<E> {
    pub fn new(store: StoreHandle<E>, overlay: LoadingOverlay) -> Self {
        Self {
            store,
            overlay,
            submitting: AtomicBool::new(false),
        }
    }

    /// Valores iniciales del formulario de edición.
    pub fn edit_values(record: &E) -> E::Update {
        record.to_update()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Envía el formulario de alta. Tras el éxito el formulario vuelve a sus valores por
    /// defecto.
    pub async fn submit_create(&self, input: E::Insert) -> SubmitOutcome<E::Insert> {
        let Some(_submitting) = self.begin() else {
            return SubmitOutcome::Busy;
        };
        let errors = input.validate();
        if !errors.is_empty() {
            debug!("Debug: alta de {} bloqueada: {}", E::config().kind, errors);
            return SubmitOutcome::Invalid(errors);
        }

        let saved = {
            let _overlay = self.overlay.guard();
            self.store.insert(input).await
        };

        if saved {
            info!("Info: alta de {} confirmada", E::config().kind);
            SubmitOutcome::Saved { reset_to: E::Insert::default() }
        } else {
            SubmitOutcome::Rejected
        }
    }

    /// Envía el formulario de edición. Tras el éxito el formulario conserva lo enviado.
    pub async fn submit_edit(&self, input: E::Update) -> SubmitOutcome<E::Update> {
        let Some(_submitting) = self.begin() else {
            return SubmitOutcome::Busy;
        };
        let errors = input.validate();
        if !errors.is_empty() {
            debug!("Debug: edición de {} bloqueada: {}", E::config().kind, errors);
            return SubmitOutcome::Invalid(errors);
        }

        let saved = {
            let _overlay = self.overlay.guard();
            self.store.update(input.clone()).await
        };

        if saved {
            info!("Info: edición de {} confirmada", E::config().kind);
            SubmitOutcome::Saved { reset_to: input }
        } else {
            SubmitOutcome::Rejected
        }
    }

    fn begin(&self) -> Option<Submitting<'_>> {
        self.submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Submitting(&self.submitting))
    }
}
