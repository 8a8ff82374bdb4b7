//! Ventas (ruta `venda/`).


use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::config::pagination::SALE_LIMIT;
use crate::entities::domain::{CollectionConfig, CollectionKind, Entity, Messages, NoFilter};
use crate::form::domain::{FieldErrors, Validate};


static CONFIG: CollectionConfig = CollectionConfig {
    kind: CollectionKind::Sale,
    route: "venda/",
    page_limit: SALE_LIMIT,
    messages: Messages {
        load_error: "Erro ao carregar vendas.",
        insert_success: "Venda adicionada com sucesso.",
        insert_error: "Erro ao adicionar venda.",
        update_success: "Venda atualizada com sucesso.",
        update_error: "Erro ao atualizar venda.",
        timeout: "Tempo esgotado ao comunicar com o servidor de vendas.",
    },
};


#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleStatus {
    #[default]
    #[serde(rename = "AGUARDANDO")]
    Pending,
    #[serde(rename = "VENDIDA")]
    Sold,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "produtoId")]
    pub product_id: i64,
    #[serde(rename = "fazendaId")]
    pub farm_id: i64,
    #[serde(rename = "produtoNome", default)]
    pub product_name: String,
    #[serde(rename = "quantidade")]
    pub quantity: f64,
    #[serde(rename = "desconto", default)]
    pub discount: f64,
    #[serde(rename = "precoUnitario")]
    pub unit_price: f64,
    #[serde(rename = "lucroUnitario", default)]
    pub unit_profit: f64,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    #[serde(rename = "dataVenda")]
    pub sale_date: NaiveDate,
    #[serde(rename = "cliente", default)]
    pub customer: String,
    #[serde(rename = "imposto", default)]
    pub tax: f64,
    #[serde(rename = "valorTotal", default)]
    pub total_value: f64,
    pub status: SaleStatus,
    #[serde(rename = "itens", default)]
    pub items: Vec<SaleItem>,
}


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleInsert {
    #[serde(rename = "dataVenda")]
    pub sale_date: NaiveDate,
    #[serde(rename = "cliente")]
    pub customer: String,
    #[serde(rename = "imposto")]
    pub tax: f64,
    #[serde(rename = "valorTotal")]
    pub total_value: f64,
    pub status: SaleStatus,
    #[serde(rename = "itens")]
    pub items: Vec<SaleItem>,
}


impl Default for SaleInsert {
    fn default() -> Self {
        Self {
            sale_date: chrono::Local::now().date_naive(),
            customer: String::new(),
            tax: 0.0,
            total_value: 0.0,
            status: SaleStatus::Pending,
            items: Vec::new(),
        }
    }
}


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleUpdate {
    pub id: i64,
    #[serde(flatten)]
    pub fields: SaleInsert,
}


impl Validate for SaleInsert {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check(self.items.is_empty(), "itens", "Adicione ao menos um produto");
        errors.check(self.tax < 0.0, "imposto", "Imposto não pode ser negativo");
        errors.check(self.total_value < 0.0, "valorTotal", "Valor total não pode ser negativo");
        errors.check(
            self.items.iter().any(|i| i.quantity <= 0.0),
            "itens.quantidade",
            "Quantidade deve ser maior que zero",
        );
        errors.check(
            self.items.iter().any(|i| i.unit_price < 0.0 || i.discount < 0.0),
            "itens.precoUnitario",
            "Preço e desconto não podem ser negativos",
        );
        errors
    }
}


impl Validate for SaleUpdate {
    fn validate(&self) -> FieldErrors {
        let mut errors = self.fields.validate();
        errors.check(self.id <= 0, "id", "Venda sem identificador");
        errors
    }
}


impl Entity for Sale {
    type Insert = SaleInsert;
    type Update = SaleUpdate;
    type Filter = NoFilter;

    fn config() -> &'static CollectionConfig {
        &CONFIG
    }

    fn to_update(&self) -> SaleUpdate {
        SaleUpdate {
            id: self.id,
            fields: SaleInsert {
                sale_date: self.sale_date,
                customer: self.customer.clone(),
                tax: self.tax,
                total_value: self.total_value,
                status: self.status,
                items: self.items.clone(),
            },
        }
    }
}
