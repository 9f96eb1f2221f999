use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoletoStatus {
    Pending,
    Paid,
    Expired,
    Canceled,
}

impl BoletoStatus {
    /// Every status in dashboard order.
    pub const ALL: [BoletoStatus; 4] = [
        BoletoStatus::Pending,
        BoletoStatus::Paid,
        BoletoStatus::Expired,
        BoletoStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BoletoStatus::Pending => "pending",
            BoletoStatus::Paid => "paid",
            BoletoStatus::Expired => "expired",
            BoletoStatus::Canceled => "canceled",
        }
    }

    /// Portuguese label shown on badges and summary cards.
    pub fn label(&self) -> &'static str {
        match self {
            BoletoStatus::Pending => "Pendente",
            BoletoStatus::Paid => "Pago",
            BoletoStatus::Expired => "Vencido",
            BoletoStatus::Canceled => "Cancelado",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            BoletoStatus::Pending => 0,
            BoletoStatus::Paid => 1,
            BoletoStatus::Expired => 2,
            BoletoStatus::Canceled => 3,
        }
    }
}

impl fmt::Display for BoletoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown status '{}' (expected pending, paid, expired or canceled)",
            self.0
        )
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for BoletoStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BoletoStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A tracked payment slip.
///
/// Field names are camelCase on the wire so the persisted collection keeps
/// the layout the browser version wrote to local storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Boleto {
    pub id: String,
    pub barcode: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub due_date: DateTime<Utc>,
    pub issuer: String,
    pub description: String,
    pub status: BoletoStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Boleto {
    /// Overdue means still pending after the due date has passed.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == BoletoStatus::Pending && self.due_date < now
    }
}

/// What the registration form submits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoletoFormData {
    pub barcode: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub due_date: Option<DateTime<Utc>>,
    pub issuer: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub status: Option<BoletoStatus>,
    pub query: Option<String>,
}

impl ListFilter {
    pub fn with_status(mut self, status: BoletoStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Description and issuer match case-insensitively. The barcode is
    /// compared as stored against the lowercased query, so a barcode with
    /// uppercase letters never matches.
    pub fn matches(&self, boleto: &Boleto) -> bool {
        if let Some(status) = self.status {
            if boleto.status != status {
                return false;
            }
        }
        match self.query.as_deref() {
            None | Some("") => true,
            Some(query) => {
                let lowered = query.to_lowercase();
                boleto.description.to_lowercase().contains(&lowered)
                    || boleto.issuer.to_lowercase().contains(&lowered)
                    || boleto.barcode.contains(&lowered)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    All,
    Only(BoletoStatus),
}

impl StatusFilter {
    /// Summary cards in the order the dashboard shows them.
    pub const CARDS: [StatusFilter; 5] = [
        StatusFilter::All,
        StatusFilter::Only(BoletoStatus::Pending),
        StatusFilter::Only(BoletoStatus::Paid),
        StatusFilter::Only(BoletoStatus::Expired),
        StatusFilter::Only(BoletoStatus::Canceled),
    ];

    pub fn matches(&self, status: BoletoStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "Total de Boletos",
            StatusFilter::Only(BoletoStatus::Pending) => "Pendentes",
            StatusFilter::Only(BoletoStatus::Paid) => "Pagos",
            StatusFilter::Only(BoletoStatus::Expired) => "Vencidos",
            StatusFilter::Only(BoletoStatus::Canceled) => "Cancelados",
        }
    }
}

impl From<BoletoStatus> for StatusFilter {
    fn from(status: BoletoStatus) -> Self {
        StatusFilter::Only(status)
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub total_amount: Decimal,
}

impl Summary {
    /// Counts one more boleto. The total saturates at `Decimal::MAX`.
    pub fn add(&mut self, amount: Decimal) {
        self.count += 1;
        self.total_amount = self.total_amount.saturating_add(amount);
    }
}
