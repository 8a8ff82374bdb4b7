//! Catálogo de eventos tipados del bus.
//!
//! Cada evento es un tipo marcador que fija su nombre y el tipo de su payload; el bus
//! sólo entrega a un suscriptor payloads del tipo que declaró.


use crate::entities::domain::CollectionKind;


pub trait Event: 'static {
    const NAME: &'static str;
    type Payload: Clone + Send + Sync + 'static;
}


/// Operación de escritura confirmada por el servidor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Update,
}


/// Una colección terminó un reset-reload exitoso.
pub struct CollectionSynced;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synced {
    pub collection: CollectionKind,
    pub items: usize,
    pub has_more: bool,
}

impl Event for CollectionSynced {
    const NAME: &'static str = "collection_synced";
    type Payload = Synced;
}


/// Un registro fue creado o actualizado en el servidor.
pub struct EntitySaved;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved {
    pub collection: CollectionKind,
    pub operation: Operation,
}

impl Event for EntitySaved {
    const NAME: &'static str = "entity_saved";
    type Payload = Saved;
}


/// La carga de una colección falló y la paginación quedó detenida.
pub struct LoadFailed;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failed {
    pub collection: CollectionKind,
    pub timed_out: bool,
}

impl Event for LoadFailed {
    const NAME: &'static str = "load_failed";
    type Payload = Failed;
}
