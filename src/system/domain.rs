//! Módulo de configuración central y gestión del entorno de ejecución.
//!
//! Este módulo actúa como la fuente única de verdad para la configuración del cliente.
//! Se encarga de leer las variables de entorno, establecer valores por defecto seguros
//! y proveer las estructuras necesarias para iniciar los subsistemas (HTTP, Stores, Logging).
//!
//! # Funcionalidades Principales
//! * **Carga de Configuración:** Lee de `.env` en desarrollo y variables de sistema en producción.
//! * **Observabilidad:** Configura `tracing_subscriber` para logs estructurados o legibles.
//! * **Errores:** Define la taxonomía de errores operativos (`ErrorType`).
//!


use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};


/// Representa la configuración global del cliente y el estado del entorno.
///
/// Esta estructura centraliza todas las variables de entorno y configuraciones
/// necesarias para hablar con la API remota de Agroflow.
///
#[derive(Debug, Clone)]
pub struct System {
    /// URL base de la API (ej. `https://api.agroflow.app/`).
    /// **Requerido**.
    pub api_base_url: String,

    /// Token Bearer opcional que se adjunta a cada petición.
    pub api_token: Option<String>,

    /// Plazo máximo en segundos para cada petición a la API.
    /// Por defecto: `15` segundos.
    pub request_timeout_secs: u64,

    /// Entorno de ejecución actual (`development`, `staging`, `production`).
    /// Afecta el formato de logs y la carga de archivos `.env`.
    pub environment: String,

    /// Nivel de detalle de los logs (ej. `info`, `debug`, `warn`).
    /// Se autoconfigura según el `environment` si no se especifica.
    pub rust_log: String,
}


impl System {

    /// Carga la configuración desde las variables de entorno.
    ///
    /// # Comportamiento
    /// * Si `ENVIRONMENT` es "development", intenta cargar un archivo `.env`.
    /// * Establece valores por defecto para variables opcionales.
    ///
    /// # Errores
    /// * `ErrorType::Config` si `API_BASE_URL` no está definida o si
    ///   `REQUEST_TIMEOUT_SECS` no es un número mayor que cero.
    pub fn new() -> Result<Self, ErrorType> {

        info!("Info: creando objeto system");

        let environment = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".into());

        if environment == "development" {
            dotenv::dotenv().ok();
        }

        Self::from_lookup(environment, |key| env::var(key).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda de variables.
    pub fn from_lookup<F>(environment: String, lookup: F) -> Result<Self, ErrorType>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("API_BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ErrorType::Config("API_BASE_URL no está configurada".into()))?;

        let request_timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                ErrorType::Config(format!("REQUEST_TIMEOUT_SECS debe ser un número: {raw}"))
            })?,
            None => defaults::REQUEST_TIMEOUT_SECS,
        };
        if request_timeout_secs == 0 {
            return Err(ErrorType::Config("REQUEST_TIMEOUT_SECS debe ser mayor que cero".into()));
        }

        let rust_log = lookup("RUST_LOG").unwrap_or_else(|| {
            match environment.as_str() {
                "development" => "debug".to_string(),
                "staging" => "info".to_string(),
                _ => "warn".to_string(),
            }
        });

        Ok(System {
            api_base_url,
            api_token: lookup("API_TOKEN").filter(|t| !t.is_empty()),
            request_timeout_secs,
            environment,
            rust_log,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}


/// Categorización de errores operativos del cliente.
#[derive(Debug, Error)]
pub enum ErrorType {
    #[error("configuración inválida: {0}")]
    Config(String),

    #[error("endpoint inválido: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("fallo de transporte: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("el servidor respondió {status}: {body}")]
    Status { status: u16, body: String },

    #[error("la petición superó el plazo de {0:?}")]
    Timeout(Duration),

    #[error("respuesta ilegible: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("error de E/S: {0}")]
    Io(#[from] std::io::Error),
}


impl ErrorType {
    /// Normaliza errores de transporte cuyo origen es un timeout de `reqwest`.
    pub fn is_timeout(&self) -> bool {
        match self {
            ErrorType::Timeout(_) => true,
            ErrorType::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }
}


/// Inicializa el sistema de trazabilidad y logs (Tracing).
///
/// Configura el formato de salida basándose en el entorno:
/// * **Production**: Salida JSON (para logs estructurados en la nube).
/// * **Development/Otros**: Salida "Pretty" (colores y formato legible).
pub fn init_tracing(system: &System) {

    let filter = EnvFilter::try_new(&system.rust_log)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt().with_env_filter(filter).with_target(false);

    if system.environment == "production" {
        builder.json().init();
    } else {
        builder.pretty().init();
    }
}


/// Valores por defecto de la configuración.
pub mod defaults {
    pub const REQUEST_TIMEOUT_SECS: u64 = 15;
}
