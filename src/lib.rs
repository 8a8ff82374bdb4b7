//! Núcleo de sincronización del cliente Agroflow.
//!
//! Cada colección remota (producciones, unidades de medida, metas, ventas y
//! transacciones) se administra con un store paginado por cursor que corre en su propia
//! tarea. Los formularios escriben a través de `form::logic::FormBinding`; los avisos,
//! el overlay de carga y el bus de eventos se comparten mediante `context::domain::AppContext`.

pub mod api;
pub mod channels;
pub mod config;
pub mod context;
pub mod entities;
pub mod events;
pub mod form;
pub mod http;
pub mod loading;
pub mod notification;
pub mod store;
pub mod system;
#[cfg(test)]
mod test_utils;
