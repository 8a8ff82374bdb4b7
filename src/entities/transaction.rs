//! Transacciones financieras (ruta `transacao/`).


use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::config::pagination::TRANSACTION_LIMIT;
use crate::entities::domain::{CollectionConfig, CollectionKind, Entity, Messages, NoFilter};
use crate::form::domain::{FieldErrors, Validate};


static CONFIG: CollectionConfig = CollectionConfig {
    kind: CollectionKind::Transaction,
    route: "transacao/",
    page_limit: TRANSACTION_LIMIT,
    messages: Messages {
        load_error: "Erro ao carregar transações.",
        insert_success: "Transação adicionada com sucesso.",
        insert_error: "Erro ao adicionar transação.",
        update_success: "Transação atualizada com sucesso.",
        update_error: "Erro ao atualizar transação.",
        timeout: "Tempo esgotado ao comunicar com o servidor de transações.",
    },
};


#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    #[default]
    #[serde(rename = "RECEITA")]
    Income,
    #[serde(rename = "DESPESA")]
    Expense,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    #[serde(rename = "tipoTransacao")]
    pub kind: TransactionKind,
    #[serde(rename = "valor")]
    pub value: f64,
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "anexo", default)]
    pub attachment: Option<String>,
}


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionInsert {
    #[serde(rename = "tipoTransacao")]
    pub kind: TransactionKind,
    #[serde(rename = "valor")]
    pub value: f64,
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "anexo", skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
}


impl Default for TransactionInsert {
    fn default() -> Self {
        Self {
            kind: TransactionKind::Income,
            value: 0.0,
            date: chrono::Local::now().date_naive(),
            attachment: None,
        }
    }
}


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionUpdate {
    pub id: i64,
    #[serde(flatten)]
    pub fields: TransactionInsert,
}


impl Validate for TransactionInsert {
    fn validate(&self) -> FieldErrors {
        let today = chrono::Local::now().date_naive();
        let mut errors = FieldErrors::new();
        errors.check(self.value.is_nan() || self.value <= 0.0, "valor", "Informe um valor maior que zero");
        errors.check(self.date > today, "data", "Data não pode ser futura");
        errors
    }
}


impl Validate for TransactionUpdate {
    fn validate(&self) -> FieldErrors {
        let mut errors = self.fields.validate();
        errors.check(self.id <= 0, "id", "Transação sem identificador");
        errors
    }
}


impl Entity for Transaction {
    type Insert = TransactionInsert;
    type Update = TransactionUpdate;
    type Filter = NoFilter;

    fn config() -> &'static CollectionConfig {
        &CONFIG
    }

    fn to_update(&self) -> TransactionUpdate {
        TransactionUpdate {
            id: self.id,
            fields: TransactionInsert {
                kind: self.kind,
                value: self.value,
                date: self.date,
                attachment: self.attachment.clone(),
            },
        }
    }
}
