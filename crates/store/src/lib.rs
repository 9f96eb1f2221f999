//! The boleto store: owns the collection of payment slips and mirrors it into
//! a durable key-value slot.
//!
//! All reads hand out copies. Every mutation goes through [`Store`], which
//! rewrites the whole collection to the slot before returning, and restores
//! its in-memory state if that write fails.

mod audit;
pub mod error;
pub mod seed;
pub mod slot;

pub use audit::AuditEvent;
pub use error::{Result, StoreError};
pub use slot::{KvSlot, MemorySlot, SledSlot};

use audit::write_audit_event;
use boleto_core::format::compute_sha256_hex;
use boleto_core::transitions::can_transition;
use boleto_core::validation::validate;
use boleto_core::{Boleto, BoletoFormData, BoletoStatus, ListFilter, StatusFilter, Summary};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::Error as _;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_KEY: &str = "boletos";

#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Slot key holding the serialized collection.
    pub key: String,
    pub audit_log: Option<PathBuf>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.to_string(),
            audit_log: None,
        }
    }
}

/// How the collection came to be when the store started.
#[derive(Debug)]
pub enum InitOutcome {
    /// Read back from the slot.
    Loaded,
    /// The slot was empty; the demonstration set was written.
    Seeded,
    /// The slot held data that could not be read. It was copied to
    /// `<key>.corrupt` and replaced by the demonstration set.
    Recovered(StoreError),
}

pub struct Store {
    slot: Arc<dyn KvSlot>,
    options: StoreOptions,
    boletos: Vec<Boleto>,
    outcome: InitOutcome,
}

impl Store {
    /// Opens the collection, seeding it when the slot is empty and falling
    /// back to the seed when the stored payload is malformed.
    pub fn initialize(slot: Arc<dyn KvSlot>, options: StoreOptions) -> Result<Self> {
        let raw = slot.read(&options.key)?;
        let mut store = Self {
            slot,
            options,
            boletos: Vec::new(),
            outcome: InitOutcome::Loaded,
        };

        match decode(raw.as_deref()) {
            Ok(boletos) if !boletos.is_empty() => {
                tracing::info!(key=%store.options.key, count=boletos.len(), "loaded boletos");
                store.boletos = boletos;
            }
            Ok(_) => {
                store.seed("collection_seeded", None)?;
                store.outcome = InitOutcome::Seeded;
            }
            Err(StoreError::Deserialization(err)) => {
                tracing::warn!(key=%store.options.key, error=%err, "stored boletos are malformed, reseeding");
                if let Some(raw) = raw.as_deref() {
                    let backup_key = format!("{}.corrupt", store.options.key);
                    store.slot.write(&backup_key, raw)?;
                }
                store.seed("collection_recovered", Some(err.to_string()))?;
                store.outcome = InitOutcome::Recovered(StoreError::Deserialization(err));
            }
            Err(other) => return Err(other),
        }

        Ok(store)
    }

    /// Reads the collection as stored, without seeding or recovery. An absent
    /// key yields an empty collection.
    pub fn load(slot: Arc<dyn KvSlot>, options: StoreOptions) -> Result<Self> {
        let raw = slot.read(&options.key)?;
        let boletos = decode(raw.as_deref())?;
        Ok(Self {
            slot,
            options,
            boletos,
            outcome: InitOutcome::Loaded,
        })
    }

    pub fn outcome(&self) -> &InitOutcome {
        &self.outcome
    }

    pub fn len(&self) -> usize {
        self.boletos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boletos.is_empty()
    }

    /// Registers a new boleto as `pending`.
    pub fn create(&mut self, data: BoletoFormData) -> Result<Boleto> {
        validate(&data).map_err(StoreError::Validation)?;
        let Some(due_date) = data.due_date else {
            unreachable!("validate rejects a form without dueDate");
        };

        let boleto = Boleto {
            id: self.fresh_id(),
            barcode: data.barcode,
            amount: data.amount,
            due_date,
            issuer: data.issuer,
            description: data.description,
            status: BoletoStatus::Pending,
            payment_date: None,
            created_at: Utc::now(),
        };

        self.boletos.push(boleto.clone());
        let hash = match self.persist() {
            Ok(hash) => hash,
            Err(e) => {
                self.boletos.pop();
                return Err(e);
            }
        };

        tracing::info!(boleto_id=%boleto.id, issuer=%boleto.issuer, amount=%boleto.amount, "boleto created");
        self.audit(AuditEvent::new("boleto_created", hash).with_boleto(&boleto.id, boleto.status));
        Ok(boleto)
    }

    /// Moves a boleto to `status`. Marking it `paid` stamps the payment date
    /// with the current time, replacing any earlier one.
    pub fn set_status(&mut self, id: &str, status: BoletoStatus) -> Result<Boleto> {
        let idx = self
            .boletos
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let previous = self.boletos[idx].clone();
        if !can_transition(previous.status, status) {
            return Err(StoreError::InvalidTransition {
                from: previous.status,
                to: status,
            });
        }

        {
            let boleto = &mut self.boletos[idx];
            boleto.status = status;
            if status == BoletoStatus::Paid {
                boleto.payment_date = Some(Utc::now());
            }
        }

        let hash = match self.persist() {
            Ok(hash) => hash,
            Err(e) => {
                self.boletos[idx] = previous;
                return Err(e);
            }
        };

        let updated = self.boletos[idx].clone();
        tracing::info!(boleto_id=%id, from=%previous.status, to=%status, "boleto status changed");
        self.audit(AuditEvent::new("status_changed", hash).with_boleto(id, status));
        Ok(updated)
    }

    /// Marks every overdue `pending` boleto as `expired`. Only runs when
    /// called; the store never derives expiry on its own.
    pub fn expire_overdue(&mut self, now: DateTime<Utc>) -> Result<Vec<Boleto>> {
        let overdue: Vec<usize> = self
            .boletos
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_overdue(now) && can_transition(b.status, BoletoStatus::Expired))
            .map(|(idx, _)| idx)
            .collect();
        if overdue.is_empty() {
            return Ok(Vec::new());
        }

        for &idx in &overdue {
            self.boletos[idx].status = BoletoStatus::Expired;
        }

        let hash = match self.persist() {
            Ok(hash) => hash,
            Err(e) => {
                for &idx in &overdue {
                    self.boletos[idx].status = BoletoStatus::Pending;
                }
                return Err(e);
            }
        };

        let expired: Vec<Boleto> = overdue.iter().map(|&idx| self.boletos[idx].clone()).collect();
        for boleto in &expired {
            self.audit(
                AuditEvent::new("overdue_expired", hash.clone())
                    .with_boleto(&boleto.id, BoletoStatus::Expired),
            );
        }
        tracing::info!(count = expired.len(), "expired overdue boletos");
        Ok(expired)
    }

    pub fn get(&self, id: &str) -> Option<Boleto> {
        self.boletos.iter().find(|b| b.id == id).cloned()
    }

    /// Matching boletos in collection order.
    pub fn list(&self, filter: &ListFilter) -> Vec<Boleto> {
        self.boletos
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect()
    }

    pub fn aggregate(&self, filter: StatusFilter) -> Summary {
        self.boletos
            .iter()
            .filter(|b| filter.matches(b.status))
            .fold(Summary::default(), |mut summary, b| {
                summary.add(b.amount);
                summary
            })
    }

    /// Summary cards: all boletos first, then one per status.
    pub fn dashboard(&self) -> Vec<(StatusFilter, Summary)> {
        StatusFilter::CARDS
            .into_iter()
            .map(|filter| (filter, self.aggregate(filter)))
            .collect()
    }

    fn seed(&mut self, event_type: &str, error: Option<String>) -> Result<()> {
        self.boletos = seed::demonstration_set(Utc::now());
        let hash = self.persist()?;
        tracing::info!(key=%self.options.key, count=self.boletos.len(), "seeded demonstration boletos");

        let mut event = AuditEvent::new(event_type, hash);
        if let Some(error) = error {
            event = event.with_error(error);
        }
        self.audit(event);
        Ok(())
    }

    /// Writes the whole collection and returns the digest of what was written.
    fn persist(&self) -> Result<String> {
        let payload = serde_json::to_string(&self.boletos).map_err(StoreError::Serialization)?;
        self.slot.write(&self.options.key, payload.as_bytes())?;
        Ok(compute_sha256_hex(&payload))
    }

    fn audit(&self, event: AuditEvent) {
        if let Some(path) = &self.options.audit_log {
            if let Err(e) = write_audit_event(path, &event) {
                tracing::warn!(path=%path.display(), error=%e, "failed to write audit event");
            }
        }
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = uuid::Uuid::new_v4().to_string();
            if !self.boletos.iter().any(|b| b.id == id) {
                return id;
            }
        }
    }
}

/// Parses a stored payload. Anything that is not a valid collection, down to
/// a negative amount, is reported as `Deserialization`.
fn decode(raw: Option<&[u8]>) -> Result<Vec<Boleto>> {
    let payload = match raw {
        None => return Ok(Vec::new()),
        Some(payload) if payload.iter().all(u8::is_ascii_whitespace) => return Ok(Vec::new()),
        Some(payload) => payload,
    };
    let boletos: Vec<Boleto> = serde_json::from_slice(payload)?;

    let mut seen = HashSet::with_capacity(boletos.len());
    for boleto in &boletos {
        if !seen.insert(boleto.id.as_str()) {
            return Err(serde_json::Error::custom(format!("duplicate boleto id {}", boleto.id)).into());
        }
        if boleto.amount < Decimal::ZERO {
            return Err(serde_json::Error::custom(format!(
                "negative amount {} on boleto {}",
                boleto.amount, boleto.id
            ))
            .into());
        }
    }
    Ok(boletos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn form(barcode: &str) -> BoletoFormData {
        BoletoFormData {
            barcode: barcode.into(),
            amount: dec!(50.00),
            due_date: Some(Utc::now() + Duration::days(10)),
            issuer: "X".into(),
            description: "Y".into(),
        }
    }

    fn empty_store() -> (Arc<MemorySlot>, Store) {
        let slot = MemorySlot::new();
        let store = Store::load(slot.clone(), StoreOptions::default()).unwrap();
        (slot, store)
    }

    /// Slot whose writes always fail, to check in-memory rollback.
    struct ReadOnlySlot(Arc<MemorySlot>);

    impl KvSlot for ReadOnlySlot {
        fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
            self.0.read(key)
        }

        fn write(&self, _key: &str, _value: &[u8]) -> Result<()> {
            Err(StoreError::Storage("read-only".into()))
        }
    }

    #[test]
    fn test_decode_absent_and_blank() {
        assert!(decode(None).unwrap().is_empty());
        assert!(decode(Some(b"  \n".as_slice())).unwrap().is_empty());
        assert!(decode(Some(b"[]".as_slice())).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        assert!(matches!(
            decode(Some([0xff, 0xfe, 0x5b].as_slice())),
            Err(StoreError::Deserialization(_))
        ));
    }

    #[test]
    fn test_decode_rejects_negative_amount() {
        let mut seed = seed::demonstration_set(Utc::now());
        seed[2].amount = dec!(-0.01);
        let payload = serde_json::to_vec(&seed).unwrap();
        match decode(Some(payload.as_slice())) {
            Err(StoreError::Deserialization(err)) => {
                assert!(err.to_string().contains("negative amount"), "{err}")
            }
            other => panic!("expected deserialization error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_duplicate_ids() {
        let seed = seed::demonstration_set(Utc::now());
        let mut doubled = seed.clone();
        doubled.push(seed[0].clone());
        let payload = serde_json::to_vec(&doubled).unwrap();
        assert!(matches!(
            decode(Some(payload.as_slice())),
            Err(StoreError::Deserialization(_))
        ));
    }

    #[test]
    fn test_create_persists_whole_collection() {
        let (slot, mut store) = empty_store();
        let first = store.create(form("111")).unwrap();
        let second = store.create(form("222")).unwrap();

        let stored: Vec<Boleto> =
            serde_json::from_slice(&slot.read(DEFAULT_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored, vec![first, second]);
    }

    #[test]
    fn test_create_rejects_invalid_form() {
        let (slot, mut store) = empty_store();
        let mut data = form("111");
        data.issuer = String::new();
        data.due_date = None;

        match store.create(data) {
            Err(StoreError::Validation(errs)) => assert_eq!(errs.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(store.is_empty());
        assert_eq!(slot.read(DEFAULT_KEY).unwrap(), None);
    }

    #[test]
    fn test_failed_write_rolls_back_create() {
        let backing = MemorySlot::new();
        let slot = Arc::new(ReadOnlySlot(backing));
        let mut store = Store::load(slot, StoreOptions::default()).unwrap();

        assert!(matches!(store.create(form("111")), Err(StoreError::Storage(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_write_rolls_back_status_change() {
        let backing = MemorySlot::new();
        let seed = seed::demonstration_set(Utc::now());
        backing
            .write(DEFAULT_KEY, &serde_json::to_vec(&seed).unwrap())
            .unwrap();
        let mut store =
            Store::load(Arc::new(ReadOnlySlot(backing)), StoreOptions::default()).unwrap();

        assert!(store.set_status("1", BoletoStatus::Paid).is_err());
        let unchanged = store.get("1").unwrap();
        assert_eq!(unchanged.status, BoletoStatus::Pending);
        assert_eq!(unchanged.payment_date, None);
    }

    #[test]
    fn test_repaying_overwrites_payment_date() {
        let (_slot, mut store) = empty_store();
        let created = store.create(form("111")).unwrap();
        let first = store.set_status(&created.id, BoletoStatus::Paid).unwrap();
        let second = store.set_status(&created.id, BoletoStatus::Paid).unwrap();
        assert!(second.payment_date >= first.payment_date);
        assert_eq!(store.get(&created.id).unwrap().payment_date, second.payment_date);
    }

    #[test]
    fn test_payment_date_kept_after_leaving_paid() {
        let (_slot, mut store) = empty_store();
        let created = store.create(form("111")).unwrap();
        let paid = store.set_status(&created.id, BoletoStatus::Paid).unwrap();
        let canceled = store.set_status(&created.id, BoletoStatus::Canceled).unwrap();
        assert_eq!(canceled.status, BoletoStatus::Canceled);
        assert_eq!(canceled.payment_date, paid.payment_date);
    }

    #[test]
    fn test_returned_records_are_copies() {
        let (_slot, mut store) = empty_store();
        let created = store.create(form("111")).unwrap();
        let mut listed = store.list(&ListFilter::default());
        listed[0].status = BoletoStatus::Paid;
        assert_eq!(store.get(&created.id).unwrap().status, BoletoStatus::Pending);
    }

    #[test]
    fn test_audit_log_records_mutations() {
        let dir = tempfile::tempdir().unwrap();
        let audit_path = dir.path().join("audit.jsonl");
        let options = StoreOptions {
            audit_log: Some(audit_path.clone()),
            ..StoreOptions::default()
        };
        let mut store = Store::initialize(MemorySlot::new(), options).unwrap();
        store.set_status("2", BoletoStatus::Paid).unwrap();

        let events: Vec<AuditEvent> = std::fs::read_to_string(&audit_path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        let kinds: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(kinds, vec!["collection_seeded", "status_changed"]);
        assert_eq!(events[1].boleto_id.as_deref(), Some("2"));
        assert_ne!(events[0].collection_hash, events[1].collection_hash);
    }
}
