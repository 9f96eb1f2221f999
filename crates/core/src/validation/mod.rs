mod rules;

use crate::models::BoletoFormData;

/// Checks a submitted form. Every failed rule is reported, prefixed with the
/// field name it belongs to.
pub fn validate(data: &BoletoFormData) -> Result<(), Vec<String>> {
    rules::required_fields(data)
}
