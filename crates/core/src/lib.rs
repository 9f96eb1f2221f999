//! Domain model for the boleto tracker: records, filters, summaries, the
//! status transition table, form validation and pt-BR display helpers.

pub mod format;
pub mod models;
pub mod transitions;
pub mod validation;

pub use models::{Boleto, BoletoFormData, BoletoStatus, ListFilter, StatusFilter, Summary};
