//! Indicador de carga global (overlay bloqueante).
//!
//! Es un único interruptor mostrar/ocultar para todo el proceso, no un contador por
//! operación: el último `hide` siempre oculta el overlay.


use std::sync::Arc;
use tokio::sync::watch;
use tracing::trace;


#[derive(Clone, Debug)]
pub struct LoadingOverlay {
    visible: Arc<watch::Sender<bool>>,
}


impl Default for LoadingOverlay {
    fn default() -> Self {
        Self::new()
    }
}


impl LoadingOverlay {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { visible: Arc::new(tx) }
    }

    pub fn show(&self) {
        trace!("Trace: overlay visible");
        self.visible.send_replace(true);
    }

    pub fn hide(&self) {
        trace!("Trace: overlay oculto");
        self.visible.send_replace(false);
    }

    pub fn is_visible(&self) -> bool {
        *self.visible.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.visible.subscribe()
    }

    /// Muestra el overlay y lo oculta cuando el guard se libera, incluso ante errores.
    pub fn guard(&self) -> LoadingGuard {
        self.show();
        LoadingGuard { overlay: self.clone() }
    }
}


#[must_use = "el overlay se oculta al liberar el guard"]
pub struct LoadingGuard {
    overlay: LoadingOverlay,
}


impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.overlay.hide();
    }
}
