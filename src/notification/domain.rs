use std::fmt;


/// Severidad de un aviso para el usuario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    /// La petición superó el plazo configurado.
    Timeout,
}


/// Mensaje legible que se muestra al usuario (toast). No transporta códigos de error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}


impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { severity: Severity::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, message: message.into() }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self { severity: Severity::Timeout, message: message.into() }
    }
}


impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.severity, self.message)
    }
}
