use serde::{Deserialize, Serialize};
use crate::config::pagination::MEASURE_UNIT_LIMIT;
use crate::entities::domain::{CollectionConfig, CollectionKind, Entity, Messages, NoFilter};
use crate::form::domain::{FieldErrors, Validate};


static CONFIG: CollectionConfig = CollectionConfig {
    kind: CollectionKind::MeasureUnit,
    route: "unidade-medida/",
    page_limit: MEASURE_UNIT_LIMIT,
    messages: Messages {
        load_error: "Erro ao carregar unidades de medida.",
        insert_success: "Unidade de medida adicionada com sucesso.",
        insert_error: "Erro ao adicionar unidade de medida.",
        update_success: "Unidade de medida atualizada com sucesso.",
        update_error: "Erro ao atualizar unidade de medida.",
        timeout: "Tempo esgotado ao comunicar com o servidor de unidades de medida.",
    },
};


/// Unidad de medida (kg, L, saca...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureUnit {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "sigla")]
    pub abbreviation: String,
}


#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MeasureUnitInsert {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "sigla")]
    pub abbreviation: String,
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeasureUnitUpdate {
    pub id: i64,
    #[serde(flatten)]
    pub fields: MeasureUnitInsert,
}


impl Validate for MeasureUnitInsert {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check(self.name.trim().is_empty(), "nome", "Informe o nome");
        errors.check(self.abbreviation.trim().is_empty(), "sigla", "Informe a sigla");
        errors.check(self.abbreviation.chars().count() > 5, "sigla", "Sigla deve ter até 5 caracteres");
        errors
    }
}


impl Validate for MeasureUnitUpdate {
    fn validate(&self) -> FieldErrors {
        let mut errors = self.fields.validate();
        errors.check(self.id <= 0, "id", "Unidade sem identificador");
        errors
    }
}


impl Entity for MeasureUnit {
    type Insert = MeasureUnitInsert;
    type Update = MeasureUnitUpdate;
    type Filter = NoFilter;

    fn config() -> &'static CollectionConfig {
        &CONFIG
    }

    fn to_update(&self) -> MeasureUnitUpdate {
        MeasureUnitUpdate {
            id: self.id,
            fields: MeasureUnitInsert {
                name: self.name.clone(),
                abbreviation: self.abbreviation.clone(),
            },
        }
    }
}
