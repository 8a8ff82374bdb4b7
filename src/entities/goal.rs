//! Metas comerciales (ruta `meta/`).
//!
//! Las metas se listan con filtros de tipo y estado; cambiar cualquiera de los dos
//! reinicia la paginación del store.


use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::config::pagination::GOAL_LIMIT;
use crate::entities::domain::{CollectionConfig, CollectionKind, Entity, Messages};
use crate::form::domain::{FieldErrors, Validate};


static CONFIG: CollectionConfig = CollectionConfig {
    kind: CollectionKind::Goal,
    route: "meta/",
    page_limit: GOAL_LIMIT,
    messages: Messages {
        load_error: "Erro ao carregar metas.",
        insert_success: "Meta adicionada com sucesso.",
        insert_error: "Erro ao adicionar meta.",
        update_success: "Meta atualizada com sucesso.",
        update_error: "Erro ao atualizar meta.",
        timeout: "Tempo esgotado ao comunicar com o servidor de metas.",
    },
};


#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalKind {
    #[default]
    #[serde(rename = "VENDA")]
    Sale,
    #[serde(rename = "PRODUCAO")]
    Production,
}


/// Magnitud con la que se mide el avance de la meta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalMeasure {
    #[default]
    #[serde(rename = "VALOR")]
    Value,
    #[serde(rename = "QUANTIDADE")]
    Quantity,
}


#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalStatus {
    #[default]
    #[serde(rename = "EM_ANDAMENTO")]
    InProgress,
    #[serde(rename = "ALCANCADA")]
    Reached,
    #[serde(rename = "NAO_ALCANCADA")]
    Missed,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "tipo")]
    pub kind: GoalKind,
    #[serde(rename = "calculoPor")]
    pub measured_by: GoalMeasure,
    pub status: GoalStatus,
    #[serde(rename = "valorAlvo")]
    pub target_value: f64,
    #[serde(rename = "valorAtual", default)]
    pub current_value: f64,
    #[serde(rename = "dataInicio")]
    pub start_date: NaiveDate,
    #[serde(rename = "dataFim")]
    pub end_date: NaiveDate,
    #[serde(rename = "produtoId", default)]
    pub product_id: Option<i64>,
}


#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalKindFilter {
    #[default]
    #[serde(rename = "TODOS")]
    All,
    #[serde(rename = "VENDA")]
    Sale,
    #[serde(rename = "PRODUCAO")]
    Production,
}


#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalStatusFilter {
    #[default]
    #[serde(rename = "TODOS")]
    All,
    #[serde(rename = "EM_ANDAMENTO")]
    InProgress,
    #[serde(rename = "ALCANCADA")]
    Reached,
    #[serde(rename = "NAO_ALCANCADA")]
    Missed,
}


/// Filtros de listado de metas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalFilter {
    #[serde(rename = "tipo")]
    pub kind: GoalKindFilter,
    pub status: GoalStatusFilter,
}


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalInsert {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "tipo")]
    pub kind: GoalKind,
    #[serde(rename = "calculoPor")]
    pub measured_by: GoalMeasure,
    #[serde(rename = "valorAlvo")]
    pub target_value: f64,
    #[serde(rename = "dataInicio")]
    pub start_date: NaiveDate,
    #[serde(rename = "dataFim")]
    pub end_date: NaiveDate,
    #[serde(rename = "produtoId")]
    pub product_id: Option<i64>,
}


impl Default for GoalInsert {
    fn default() -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            title: String::new(),
            kind: GoalKind::Sale,
            measured_by: GoalMeasure::Value,
            target_value: 0.0,
            start_date: today,
            end_date: today,
            product_id: None,
        }
    }
}


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalUpdate {
    pub id: i64,
    #[serde(flatten)]
    pub fields: GoalInsert,
}


impl Validate for GoalInsert {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check(self.title.trim().is_empty(), "titulo", "Informe o título");
        errors.check(self.target_value <= 0.0, "valorAlvo", "Valor alvo deve ser maior que zero");
        errors.check(self.end_date < self.start_date, "dataFim", "Data fim anterior à data início");
        errors.check(
            self.kind == GoalKind::Production && self.product_id.is_none(),
            "produtoId",
            "Selecione o produto da meta de produção",
        );
        errors
    }
}


impl Validate for GoalUpdate {
    fn validate(&self) -> FieldErrors {
        let mut errors = self.fields.validate();
        errors.check(self.id <= 0, "id", "Meta sem identificador");
        errors
    }
}


impl Entity for Goal {
    type Insert = GoalInsert;
    type Update = GoalUpdate;
    type Filter = GoalFilter;

    fn config() -> &'static CollectionConfig {
        &CONFIG
    }

    fn to_update(&self) -> GoalUpdate {
        GoalUpdate {
            id: self.id,
            fields: GoalInsert {
                title: self.title.clone(),
                kind: self.kind,
                measured_by: self.measured_by,
                target_value: self.target_value,
                start_date: self.start_date,
                end_date: self.end_date,
                product_id: self.product_id,
            },
        }
    }
}
