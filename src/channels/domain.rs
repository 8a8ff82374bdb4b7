use tokio::sync::mpsc;
use crate::config::channels::{NOTIFICATIONS, STORE_COMMANDS};
use crate::entities::goal::Goal;
use crate::entities::measure_unit::MeasureUnit;
use crate::entities::production::Production;
use crate::entities::sale::Sale;
use crate::entities::transaction::Transaction;
use crate::notification::domain::Notification;
use crate::store::domain::Command;


pub struct Channels {
    pub handles_to_production: mpsc::Sender<Command<Production>>,
    pub production_from_handles: mpsc::Receiver<Command<Production>>,

    pub handles_to_measure_unit: mpsc::Sender<Command<MeasureUnit>>,
    pub measure_unit_from_handles: mpsc::Receiver<Command<MeasureUnit>>,

    pub handles_to_goal: mpsc::Sender<Command<Goal>>,
    pub goal_from_handles: mpsc::Receiver<Command<Goal>>,

    pub handles_to_sale: mpsc::Sender<Command<Sale>>,
    pub sale_from_handles: mpsc::Receiver<Command<Sale>>,

    pub handles_to_transaction: mpsc::Sender<Command<Transaction>>,
    pub transaction_from_handles: mpsc::Receiver<Command<Transaction>>,

    pub stores_to_notifier: mpsc::Sender<Notification>,
    pub notifier_from_stores: mpsc::Receiver<Notification>,
}


impl Default for Channels {
    fn default() -> Self {
        Self::new()
    }
}


impl Channels {
    pub fn new() -> Channels {
        let (h_to_p, p_from_h) = mpsc::channel::<Command<Production>>(STORE_COMMANDS);
        let (h_to_mu, mu_from_h) = mpsc::channel::<Command<MeasureUnit>>(STORE_COMMANDS);
        let (h_to_g, g_from_h) = mpsc::channel::<Command<Goal>>(STORE_COMMANDS);
        let (h_to_s, s_from_h) = mpsc::channel::<Command<Sale>>(STORE_COMMANDS);
        let (h_to_t, t_from_h) = mpsc::channel::<Command<Transaction>>(STORE_COMMANDS);
        let (s_to_n, n_from_s) = mpsc::channel::<Notification>(NOTIFICATIONS);

        Self {
            handles_to_production: h_to_p,
            production_from_handles: p_from_h,
            handles_to_measure_unit: h_to_mu,
            measure_unit_from_handles: mu_from_h,
            handles_to_goal: h_to_g,
            goal_from_handles: g_from_h,
            handles_to_sale: h_to_s,
            sale_from_handles: s_from_h,
            handles_to_transaction: h_to_t,
            transaction_from_handles: t_from_h,
            stores_to_notifier: s_to_n,
            notifier_from_stores: n_from_s,
        }
    }
}
