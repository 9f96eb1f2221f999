use boleto_core::{Boleto, BoletoStatus};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

/// Demonstration records written on first run. Covers every status, with
/// due dates relative to `now`.
pub fn demonstration_set(now: DateTime<Utc>) -> Vec<Boleto> {
    let days = Duration::days;
    vec![
        Boleto {
            id: "1".into(),
            barcode: "23793381286000900001192000010201202200051437".into(),
            amount: Decimal::new(12475, 2),
            due_date: now + days(3),
            issuer: "Empresa de Energia".into(),
            description: "Conta de Luz - Junho".into(),
            status: BoletoStatus::Pending,
            payment_date: None,
            created_at: now,
        },
        Boleto {
            id: "2".into(),
            barcode: "83690000006 1 44220523007 9 50892122900 7 82230170811 1".into(),
            amount: Decimal::new(6144, 2),
            due_date: now + days(5),
            issuer: "Companhia de Água".into(),
            description: "Conta de Água - Junho".into(),
            status: BoletoStatus::Pending,
            payment_date: None,
            created_at: now,
        },
        Boleto {
            id: "3".into(),
            barcode: "83680000001 2 14220523007 4 90892337842 9 82230170811 8".into(),
            amount: Decimal::new(11299, 2),
            due_date: now - days(10),
            issuer: "Operadora de Telefonia".into(),
            description: "Internet Fibra - Maio".into(),
            status: BoletoStatus::Paid,
            payment_date: Some(now - days(15)),
            created_at: now - days(30),
        },
        Boleto {
            id: "4".into(),
            barcode: "23791234500900001192000010201202200051437".into(),
            amount: Decimal::new(9050, 2),
            due_date: now - days(30),
            issuer: "Cartão de Crédito".into(),
            description: "Fatura - Maio".into(),
            status: BoletoStatus::Expired,
            payment_date: None,
            created_at: now - days(45),
        },
        Boleto {
            id: "5".into(),
            barcode: "83670000001 6 14220523007 3 90892337842 0 82230170811 4".into(),
            amount: Decimal::new(15000, 2),
            due_date: now - days(5),
            issuer: "Academia FitLife".into(),
            description: "Mensalidade - Junho".into(),
            status: BoletoStatus::Canceled,
            payment_date: None,
            created_at: now - days(15),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    #[test]
    fn test_seed_spans_every_status() {
        let seed = demonstration_set(Utc::now());
        assert_eq!(seed.len(), 5);
        let statuses: HashSet<_> = seed.iter().map(|b| b.status).collect();
        assert_eq!(statuses.len(), BoletoStatus::ALL.len());
    }

    #[test]
    fn test_seed_ids_are_unique() {
        let seed = demonstration_set(Utc::now());
        let ids: HashSet<_> = seed.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids.len(), seed.len());
    }

    #[test]
    fn test_only_paid_record_has_payment_date() {
        for boleto in demonstration_set(Utc::now()) {
            assert_eq!(
                boleto.payment_date.is_some(),
                boleto.status == BoletoStatus::Paid
            );
        }
    }

    #[test]
    fn test_seed_total() {
        let total: Decimal = demonstration_set(Utc::now()).iter().map(|b| b.amount).sum();
        assert_eq!(total, dec!(539.68));
    }
}
