use anyhow::{anyhow, bail, Context, Result};
use boleto_core::format::{format_brl, format_date, parse_brl_amount};
use boleto_core::{Boleto, BoletoFormData, BoletoStatus, ListFilter, StatusFilter};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use store::Store;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoletoView {
    pub id: String,
    pub barcode: String,
    pub amount: String,
    pub due_date: String,
    pub issuer: String,
    pub description: String,
    pub status: BoletoStatus,
    pub status_label: String,
    pub payment_date: Option<String>,
    pub created_at: String,
}

impl From<Boleto> for BoletoView {
    fn from(b: Boleto) -> Self {
        Self {
            id: b.id,
            barcode: b.barcode,
            amount: format_brl(b.amount),
            due_date: format_date(b.due_date),
            issuer: b.issuer,
            description: b.description,
            status: b.status,
            status_label: b.status.label().to_string(),
            // Only shown while paid, like the card's "Pago em" line.
            payment_date: b
                .payment_date
                .filter(|_| b.status == BoletoStatus::Paid)
                .map(format_date),
            created_at: format_date(b.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub barcode: String,
    /// Masked currency input; digits are read as cents.
    pub amount: String,
    /// `YYYY-MM-DD`
    pub due_date: String,
    pub issuer: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryCard {
    pub label: String,
    pub count: usize,
    pub total: String,
}

pub fn list_boletos(
    store: &Store,
    status: Option<BoletoStatus>,
    query: Option<String>,
) -> Vec<BoletoView> {
    let filter = ListFilter { status, query };
    store
        .list(&filter)
        .into_iter()
        .map(BoletoView::from)
        .collect()
}

pub fn register_boleto(store: &mut Store, req: RegisterRequest) -> Result<BoletoView> {
    let amount = parse_brl_amount(&req.amount)
        .ok_or_else(|| anyhow!("amount: Valor é obrigatório (got '{}')", req.amount))?;
    let due_date = NaiveDate::parse_from_str(req.due_date.trim(), "%Y-%m-%d")
        .with_context(|| format!("dueDate: expected YYYY-MM-DD, got '{}'", req.due_date))?;
    if due_date < Utc::now().date_naive() {
        bail!("dueDate: {due_date} is in the past");
    }

    let data = BoletoFormData {
        barcode: req.barcode,
        amount,
        due_date: Some(due_date.and_time(NaiveTime::MIN).and_utc()),
        issuer: req.issuer,
        description: req.description,
    };
    let boleto = store.create(data)?;
    tracing::info!(boleto_id=%boleto.id, "registered boleto");
    Ok(boleto.into())
}

pub fn update_status(store: &mut Store, id: &str, status: BoletoStatus) -> Result<BoletoView> {
    Ok(store.set_status(id, status)?.into())
}

pub fn show_boleto(store: &Store, id: &str) -> Result<BoletoView> {
    store
        .get(id)
        .map(BoletoView::from)
        .ok_or_else(|| anyhow!("boleto not found: {id}"))
}

pub fn summary(store: &Store) -> Vec<SummaryCard> {
    store
        .dashboard()
        .into_iter()
        .map(|(filter, s)| SummaryCard {
            label: filter.label().to_string(),
            count: s.count,
            total: format_brl(s.total_amount),
        })
        .collect()
}

pub fn summary_for(store: &Store, filter: StatusFilter) -> SummaryCard {
    let s = store.aggregate(filter);
    SummaryCard {
        label: filter.label().to_string(),
        count: s.count,
        total: format_brl(s.total_amount),
    }
}

pub fn expire_overdue(store: &mut Store) -> Result<Vec<BoletoView>> {
    let expired = store.expire_overdue(Utc::now())?;
    Ok(expired.into_iter().map(BoletoView::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use store::{MemorySlot, StoreOptions};

    fn seeded() -> Store {
        Store::initialize(MemorySlot::new(), StoreOptions::default()).unwrap()
    }

    fn request(amount: &str, due_date: String) -> RegisterRequest {
        RegisterRequest {
            barcode: "34191790010104351004791020150008291070026000".into(),
            amount: amount.into(),
            due_date,
            issuer: "Condomínio Solar".into(),
            description: "Taxa condominial".into(),
        }
    }

    fn tomorrow() -> String {
        (Utc::now() + Duration::days(1)).format("%Y-%m-%d").to_string()
    }

    #[test]
    fn test_register_parses_masked_amount() {
        let mut store = seeded();
        let view = register_boleto(&mut store, request("R$ 1.250,00", tomorrow())).unwrap();
        assert_eq!(view.amount, "R$ 1.250,00");
        assert_eq!(view.status, BoletoStatus::Pending);
        assert_eq!(view.status_label, "Pendente");
        assert_eq!(view.payment_date, None);
        assert_eq!(store.len(), 6);
    }

    #[test]
    fn test_register_rejects_past_due_date() {
        let mut store = seeded();
        assert!(register_boleto(&mut store, request("10,00", "2001-01-01".into())).is_err());
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_register_rejects_bad_inputs() {
        let mut store = seeded();
        assert!(register_boleto(&mut store, request("R$", tomorrow())).is_err());
        assert!(register_boleto(&mut store, request("10,00", "15/06/2031".into())).is_err());

        let mut blank = request("10,00", tomorrow());
        blank.issuer = "  ".into();
        let err = register_boleto(&mut store, blank).unwrap_err();
        assert!(err.to_string().contains("issuer"));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_update_status_shows_payment_date_only_when_paid() {
        let mut store = seeded();
        let paid = update_status(&mut store, "1", BoletoStatus::Paid).unwrap();
        assert!(paid.payment_date.is_some());
        let canceled = update_status(&mut store, "1", BoletoStatus::Canceled).unwrap();
        assert_eq!(canceled.payment_date, None);
        assert!(store.get("1").unwrap().payment_date.is_some());
    }

    #[test]
    fn test_show_unknown_boleto() {
        assert!(show_boleto(&seeded(), "nope").is_err());
        assert_eq!(show_boleto(&seeded(), "4").unwrap().status_label, "Vencido");
    }

    #[test]
    fn test_summary_cards() {
        let cards = summary(&seeded());
        let labels: Vec<_> = cards.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Total de Boletos", "Pendentes", "Pagos", "Vencidos", "Cancelados"]
        );
        assert_eq!(cards[0].count, 5);
        assert_eq!(cards[0].total, "R$ 539,68");
        assert_eq!(cards[4].total, "R$ 150,00");
    }

    #[test]
    fn test_list_with_query() {
        let store = seeded();
        let views = list_boletos(&store, None, Some("fitlife".into()));
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].status, BoletoStatus::Canceled);
        assert_eq!(
            summary_for(&store, StatusFilter::Only(BoletoStatus::Paid)).total,
            "R$ 112,99"
        );
    }
}
