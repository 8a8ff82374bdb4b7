//! Contrato común de las entidades sincronizadas.
//!
//! Cada entidad del dominio (Producción, Unidad de Medida, Meta, Venta, Transacción)
//! declara sus payloads de inserción/actualización, su filtro de listado y una
//! configuración estática (`CollectionConfig`). El store genérico se instancia a partir
//! de esta información, sin lógica duplicada por entidad.


use std::fmt;
use std::fmt::Debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use crate::form::domain::Validate;


/// Identificador de cada colección remota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Production,
    MeasureUnit,
    Goal,
    Sale,
    Transaction,
}


impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CollectionKind::Production => "producao",
            CollectionKind::MeasureUnit => "medida",
            CollectionKind::Goal => "meta",
            CollectionKind::Sale => "venda",
            CollectionKind::Transaction => "transacao",
        };
        f.write_str(name)
    }
}


/// Mensajes visibles para el usuario asociados a una colección.
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    pub load_error: &'static str,
    pub insert_success: &'static str,
    pub insert_error: &'static str,
    pub update_success: &'static str,
    pub update_error: &'static str,
    pub timeout: &'static str,
}


/// Configuración estática de una colección: ruta base, tamaño de página y mensajes.
///
/// La ruta base se usa tal cual para el listado; las mutaciones agregan
/// `inserir` / `atualizar` (ej. `producao/inserir`).
#[derive(Debug, Clone, Copy)]
pub struct CollectionConfig {
    pub kind: CollectionKind,
    pub route: &'static str,
    pub page_limit: u32,
    pub messages: Messages,
}


impl CollectionConfig {
    pub fn list_route(&self) -> &'static str {
        self.route
    }

    pub fn insert_route(&self) -> String {
        format!("{}inserir", self.route)
    }

    pub fn update_route(&self) -> String {
        format!("{}atualizar", self.route)
    }
}


/// Filtro vacío para colecciones sin criterios de búsqueda.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoFilter {}


/// Registro remoto administrado por un store paginado.
pub trait Entity: Clone + Debug + Send + Sync + DeserializeOwned + 'static {
    /// Payload de creación.
    type Insert: Serialize + Validate + Default + Clone + Debug + Send + Sync + 'static;
    /// Payload de actualización.
    type Update: Serialize + Validate + Clone + Debug + Send + Sync + 'static;
    /// Criterios de listado que viajan junto a la petición de página.
    type Filter: Serialize + Default + Clone + Debug + PartialEq + Send + Sync + 'static;

    fn config() -> &'static CollectionConfig;

    /// Valores con los que se precarga el formulario de edición.
    fn to_update(&self) -> Self::Update;
}
