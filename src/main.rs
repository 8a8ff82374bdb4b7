use tokio::signal;
use tracing::info;
use agroflow_sync::channels::domain::Channels;
use agroflow_sync::context::domain::{AppContext, Stores};
use agroflow_sync::events::logic::start_event_log;
use agroflow_sync::notification::logic::start_notifier;
use agroflow_sync::store::logic::start_store;
use agroflow_sync::system::domain::{init_tracing, ErrorType, System};


#[tokio::main]
async fn main() -> Result<(), ErrorType> {

    let system = System::new()?;
    init_tracing(&system);

    let channels = Channels::new();
    let app_context = AppContext::new(system, channels.stores_to_notifier)?;

    start_notifier(channels.notifier_from_stores);

    start_event_log(&app_context.events);

    let stores = Stores {
        production: start_store(channels.handles_to_production,
                                channels.production_from_handles,
                                app_context.service(),
                                app_context.store_context()),

        measure_units: start_store(channels.handles_to_measure_unit,
                                   channels.measure_unit_from_handles,
                                   app_context.service(),
                                   app_context.store_context()),

        goals: start_store(channels.handles_to_goal,
                           channels.goal_from_handles,
                           app_context.service(),
                           app_context.store_context()),

        sales: start_store(channels.handles_to_sale,
                           channels.sale_from_handles,
                           app_context.service(),
                           app_context.store_context()),

        transactions: start_store(channels.handles_to_transaction,
                                  channels.transaction_from_handles,
                                  app_context.service(),
                                  app_context.store_context()),
    };

    stores.reset_all().await;

    info!("Info: cliente listo, esperando Ctrl-C");
    signal::ctrl_c().await?;
    info!("Info: apagando cliente");

    Ok(())
}
