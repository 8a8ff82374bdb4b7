//! Contratos de la API remota.
//!
//! Define el formato de paginación por cursor que comparten todas las colecciones y el
//! trait `RemoteCollection`, que es la costura entre el store y el transporte HTTP.


use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use crate::entities::domain::Entity;
use crate::system::domain::ErrorType;


/// Token opaco que identifica el último registro visto.
///
/// El servidor puede enviarlo como texto o como número; ambos se conservan como texto.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Cursor(String);


impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Cursor(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}


impl<'de> Deserialize<'de> for Cursor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Cursor(text),
            Raw::Number(number) => Cursor(number.to_string()),
        })
    }
}


/// Petición de página: `{"limite": n, "ultimoId": cursor|null, ...filtro}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRequest<F> {
    #[serde(rename = "limite")]
    pub limit: u32,
    #[serde(rename = "ultimoId")]
    pub cursor: Option<Cursor>,
    #[serde(flatten)]
    pub filter: F,
}


/// Respuesta de página: `{"dados": [...], "temMais": bool, "ultimoId": cursor|null}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page<T> {
    #[serde(rename = "dados", default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(rename = "temMais", default)]
    pub has_more: bool,
    #[serde(rename = "ultimoId", default)]
    pub next_cursor: Option<Cursor>,
}


/// Operaciones lógicas que expone el backend para cada colección.
#[async_trait]
pub trait RemoteCollection<E: Entity>: Send + Sync {
    async fn list(&self, request: PageRequest<E::Filter>) -> Result<Page<E>, ErrorType>;

    async fn create(&self, payload: E::Insert) -> Result<(), ErrorType>;

    async fn update(&self, payload: E::Update) -> Result<(), ErrorType>;
}
