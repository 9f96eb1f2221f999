use crate::models::BoletoFormData;
use rust_decimal::Decimal;

pub fn required_fields(data: &BoletoFormData) -> Result<(), Vec<String>> {
    let mut errs = Vec::new();

    if data.barcode.trim().is_empty() {
        errs.push("barcode: Código de barras é obrigatório".to_string());
    }

    if data.amount < Decimal::ZERO {
        errs.push("amount: Valor não pode ser negativo".to_string());
    }

    if data.due_date.is_none() {
        errs.push("dueDate: Data de vencimento é obrigatória".to_string());
    }

    if data.issuer.trim().is_empty() {
        errs.push("issuer: Emissor é obrigatório".to_string());
    }

    if data.description.trim().is_empty() {
        errs.push("description: Descrição é obrigatória".to_string());
    }

    if errs.is_empty() {
        Ok(())
    } else {
        Err(errs)
    }
}
