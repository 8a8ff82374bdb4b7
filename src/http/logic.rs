//! Cliente HTTP genérico hacia la API de Agroflow.
//!
//! Envuelve un único `reqwest::Client` (pool de conexiones compartido) con la URL base,
//! el token Bearer opcional y los plazos configurados. Todas las rutas de la API son
//! `POST` con cuerpo JSON.


use std::time::Duration;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};
use url::Url;
use crate::system::domain::{ErrorType, System};


const CONNECT_TIMEOUT_SECS: u64 = 10;


#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base: Url,
    token: Option<String>,
}


impl ApiClient {
    pub fn new(system: &System) -> Result<Self, ErrorType> {
        let base = normalize_base(&system.api_base_url)?;

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(system.request_timeout())
            .gzip(true)
            .build()?;

        Ok(Self {
            http,
            base,
            token: system.api_token.clone(),
        })
    }

    /// Resuelve una ruta relativa (`producao/inserir`) contra la URL base.
    pub fn endpoint(&self, route: &str) -> Result<Url, ErrorType> {
        Ok(self.base.join(route.trim_start_matches('/'))?)
    }

    /// `POST` con cuerpo JSON y respuesta JSON tipada.
    pub async fn post<B, R>(&self, route: &str, body: &B) -> Result<R, ErrorType>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.send(route, body).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            error!("Error: respuesta ilegible en {}: {}", route, e);
            ErrorType::Decode(e)
        })
    }

    /// `POST` cuyo cuerpo de respuesta se descarta (inserciones y actualizaciones).
    pub async fn post_unit<B>(&self, route: &str, body: &B) -> Result<(), ErrorType>
    where
        B: Serialize + ?Sized,
    {
        self.send(route, body).await?;
        Ok(())
    }

    async fn send<B>(&self, route: &str, body: &B) -> Result<Response, ErrorType>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(route)?;
        debug!("Debug: POST {}", url);

        let mut request = self.http.post(url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            error!("Error: fallo de transporte en {}: {}", route, e);
            ErrorType::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Error: {} respondió {}", route, status);
            return Err(ErrorType::Status { status: status.as_u16(), body });
        }

        Ok(response)
    }
}


/// Garantiza que la URL base termine en `/` para que `Url::join` conserve el prefijo.
fn normalize_base(raw: &str) -> Result<Url, ErrorType> {
    let mut base = Url::parse(raw.trim())?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}
