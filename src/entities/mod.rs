pub mod domain;
pub mod goal;
pub mod measure_unit;
pub mod production;
pub mod sale;
pub mod transaction;
