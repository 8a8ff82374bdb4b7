//! Tipos de la capa de formularios: errores por campo y resultado del envío.


use std::collections::BTreeMap;
use std::fmt;


/// Errores de validación indexados por nombre de campo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);


impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Registra `message` en `field` cuando `failed` es verdadero.
    pub fn check(&mut self, failed: bool, field: &'static str, message: &str) {
        if failed {
            self.add(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}


impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        f.write_str(&parts.join(", "))
    }
}


/// Validación previa al envío. Nunca produce tráfico de red.
pub trait Validate {
    fn validate(&self) -> FieldErrors;
}


/// Resultado de enviar un formulario.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    /// La validación bloqueó el envío.
    Invalid(FieldErrors),
    /// Ya hay un envío en curso para este formulario.
    Busy,
    /// El servidor confirmó la operación; el formulario se reinicia con `reset_to`.
    Saved { reset_to: T },
    /// La operación falló; el usuario ya fue notificado.
    Rejected,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_message_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.add("valor", "Informe o valor");
        errors.add("valor", "Valor inválido");
        errors.check(false, "data", "Data inválida");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("valor"), Some("Informe o valor"));
        assert_eq!(errors.to_string(), "valor: Informe o valor");
    }
}
