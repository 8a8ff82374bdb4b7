//! Canal de avisos al usuario.
//!
//! `Notifier` es el extremo emisor: "dispara y olvida", nunca bloquea al store. Si el canal
//! está lleno o cerrado el aviso se descarta y queda registrado en los logs.
//! `run_notifier` es la tarea que consume los avisos y los presenta.


use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{error, info, warn};
use super::domain::{Notification, Severity};


#[derive(Clone, Debug)]
pub struct Notifier {
    tx: mpsc::Sender<Notification>,
}


impl Notifier {
    pub fn new(tx: mpsc::Sender<Notification>) -> Self {
        Self { tx }
    }

    pub fn notify(&self, notification: Notification) {
        match self.tx.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(n)) => {
                warn!("Warning: canal de avisos lleno, se descarta {}", n);
            }
            Err(TrySendError::Closed(n)) => {
                error!("Error: canal de avisos cerrado, se descarta {}", n);
            }
        }
    }

    pub fn success(&self, message: &str) {
        self.notify(Notification::success(message));
    }

    pub fn error(&self, message: &str) {
        self.notify(Notification::error(message));
    }

    pub fn timeout(&self, message: &str) {
        self.notify(Notification::timeout(message));
    }
}


/// Presenta cada aviso recibido. Termina cuando todos los `Notifier` se liberan.
pub async fn run_notifier(mut rx: mpsc::Receiver<Notification>) {
    info!("Info: notifier task creada");

    while let Some(notification) = rx.recv().await {
        match notification.severity {
            Severity::Success => info!(toast = "success", "{}", notification.message),
            Severity::Error => error!(toast = "error", "{}", notification.message),
            Severity::Timeout => warn!(toast = "timeout", "{}", notification.message),
        }
    }

    info!("Info: notifier task finalizada");
}


pub fn start_notifier(rx_from_stores: mpsc::Receiver<Notification>) {

    tokio::spawn(async move {
        run_notifier(rx_from_stores).await;
    });
}
