//! Producción agrícola (ruta `producao/`).
//!
//! Una producción planifica cantidad y precio para un producto en una finca, consume
//! insumos y, al pasar a `COLHIDA`, registra el bloque de cosecha (cantidad colhida,
//! pérdidas, costo y precio final).


use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::config::pagination::PRODUCTION_LIMIT;
use crate::entities::domain::{CollectionConfig, CollectionKind, Entity, Messages, NoFilter};
use crate::form::domain::{FieldErrors, Validate};


static CONFIG: CollectionConfig = CollectionConfig {
    kind: CollectionKind::Production,
    route: "producao/",
    page_limit: PRODUCTION_LIMIT,
    messages: Messages {
        load_error: "Erro ao carregar produções.",
        insert_success: "Produção adicionada com sucesso.",
        insert_error: "Erro ao adicionar produção.",
        update_success: "Produção atualizada com sucesso.",
        update_error: "Erro ao atualizar produção.",
        timeout: "Tempo esgotado ao comunicar com o servidor de produções.",
    },
};


#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductionStatus {
    #[default]
    Aguardando,
    EmProducao,
    Colhida,
}


/// Cantidad de un insumo consumido por la producción.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputUsage {
    #[serde(rename = "insumoId")]
    pub input_id: i64,
    #[serde(rename = "quantidade")]
    pub quantity: f64,
}


/// Datos registrados al cosechar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Harvest {
    #[serde(rename = "quantidadeColhida")]
    pub harvested_quantity: f64,
    #[serde(rename = "perdas")]
    pub losses: f64,
    #[serde(rename = "custoProducao")]
    pub production_cost: f64,
    #[serde(rename = "precoFinal")]
    pub final_price: f64,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Production {
    pub id: i64,
    #[serde(rename = "produtoId")]
    pub product_id: i64,
    #[serde(rename = "fazendaId")]
    pub farm_id: i64,
    #[serde(rename = "lote", default)]
    pub lot: String,
    #[serde(rename = "quantidadePlanejada")]
    pub planned_quantity: f64,
    #[serde(rename = "precoPlanejado")]
    pub planned_price: f64,
    pub status: ProductionStatus,
    #[serde(rename = "dataInicio")]
    pub start_date: NaiveDate,
    #[serde(rename = "dataFim")]
    pub end_date: NaiveDate,
    #[serde(rename = "insumos", default)]
    pub inputs: Vec<InputUsage>,
    #[serde(rename = "quantidadeColhida", default)]
    pub harvested_quantity: Option<f64>,
    #[serde(rename = "perdas", default)]
    pub losses: Option<f64>,
    #[serde(rename = "custoProducao", default)]
    pub production_cost: Option<f64>,
    #[serde(rename = "precoFinal", default)]
    pub final_price: Option<f64>,
}


impl Production {
    /// Bloque de cosecha; el backend envía `null` en cada campo hasta que la producción es colhida.
    pub fn harvest(&self) -> Option<Harvest> {
        Some(Harvest {
            harvested_quantity: self.harvested_quantity?,
            losses: self.losses?,
            production_cost: self.production_cost?,
            final_price: self.final_price?,
        })
    }

    /// Una producción cosechada ya no admite edición.
    pub fn is_read_only(&self) -> bool {
        self.status == ProductionStatus::Colhida
    }
}


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionInsert {
    #[serde(rename = "produtoId")]
    pub product_id: i64,
    #[serde(rename = "fazendaId")]
    pub farm_id: i64,
    #[serde(rename = "lote")]
    pub lot: String,
    #[serde(rename = "quantidadePlanejada")]
    pub planned_quantity: f64,
    #[serde(rename = "precoPlanejado")]
    pub planned_price: f64,
    pub status: ProductionStatus,
    #[serde(rename = "dataInicio")]
    pub start_date: NaiveDate,
    #[serde(rename = "dataFim")]
    pub end_date: NaiveDate,
    #[serde(rename = "insumos")]
    pub inputs: Vec<InputUsage>,
    #[serde(flatten)]
    pub harvest: Option<Harvest>,
}


impl Default for ProductionInsert {
    fn default() -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            product_id: 0,
            farm_id: 0,
            lot: String::new(),
            planned_quantity: 0.0,
            planned_price: 0.0,
            status: ProductionStatus::Aguardando,
            start_date: today,
            end_date: end_of_month(today),
            inputs: Vec::new(),
            harvest: None,
        }
    }
}


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionUpdate {
    pub id: i64,
    #[serde(flatten)]
    pub fields: ProductionInsert,
}


/// Último día del mes de `date`.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    use chrono::Datelike;
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}


impl Validate for ProductionInsert {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check(self.farm_id <= 0, "fazendaId", "Selecione a fazenda");
        errors.check(self.product_id <= 0, "produtoId", "Selecione o produto");
        errors.check(self.lot.trim().is_empty(), "lote", "Informe o lote");
        errors.check(self.planned_quantity <= 0.0, "quantidadePlanejada", "Quantidade deve ser maior que zero");
        errors.check(self.planned_price < 0.0, "precoPlanejado", "Preço não pode ser negativo");
        errors.check(self.end_date < self.start_date, "dataFim", "Data fim anterior à data início");
        errors.check(
            self.inputs.iter().any(|i| i.quantity < 0.0),
            "insumos",
            "Quantidade de insumo não pode ser negativa",
        );

        match (&self.status, &self.harvest) {
            (ProductionStatus::Colhida, None) => {
                errors.add("quantidadeColhida", "Informe os dados da colheita");
            }
            (ProductionStatus::Colhida, Some(h)) => {
                errors.check(h.harvested_quantity < 0.0, "quantidadeColhida", "Quantidade colhida inválida");
                errors.check(h.losses < 0.0, "perdas", "Perdas não podem ser negativas");
                errors.check(h.production_cost < 0.0, "custoProducao", "Custo não pode ser negativo");
                errors.check(h.final_price < 0.0, "precoFinal", "Preço final não pode ser negativo");
            }
            _ => {}
        }
        errors
    }
}


impl Validate for ProductionUpdate {
    fn validate(&self) -> FieldErrors {
        let mut errors = self.fields.validate();
        errors.check(self.id <= 0, "id", "Produção sem identificador");
        errors
    }
}


impl Entity for Production {
    type Insert = ProductionInsert;
    type Update = ProductionUpdate;
    type Filter = NoFilter;

    fn config() -> &'static CollectionConfig {
        &CONFIG
    }

    fn to_update(&self) -> ProductionUpdate {
        ProductionUpdate {
            id: self.id,
            fields: ProductionInsert {
                product_id: self.product_id,
                farm_id: self.farm_id,
                lot: self.lot.clone(),
                planned_quantity: self.planned_quantity,
                planned_price: self.planned_price,
                status: self.status,
                start_date: self.start_date,
                end_date: self.end_date,
                inputs: self.inputs.clone(),
                harvest: self.harvest(),
            },
        }
    }
}
