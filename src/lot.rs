//! Core lot record model and key derivation
use super::error::TransferError;
use chrono::Utc;
use std::fmt;
use std::str::FromStr;

/// Separator used when deriving a key from lot components.
pub const KEY_SEPARATOR: char = '_';

/// Sale state recorded on a lot. This is an audit label: no operation is
/// gated on it, and a changed or purchased lot may itself be sold again.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum LotStatus {
    #[n(0)]
    #[default]
    OnSale,
    #[n(1)]
    Purchased,
    #[n(2)]
    Changed,
}

impl fmt::Display for LotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LotStatus::OnSale => "on sale",
            LotStatus::Purchased => "purchased",
            LotStatus::Changed => "changed",
        };
        f.write_str(label)
    }
}

impl FromStr for LotStatus {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on sale" => Ok(LotStatus::OnSale),
            "purchased" => Ok(LotStatus::Purchased),
            "changed" => Ok(LotStatus::Changed),
            other => Err(TransferError::invalid(format!(
                "unknown lot status \"{other}\""
            ))),
        }
    }
}

/// A quantity of one product held by one owner, stored under a unique key.
///
/// Date fields and `value` are opaque strings: the ledger stores them as
/// given and never parses or orders them. `quantity` is the only numeric
/// field and must stay non-negative across every operation.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Eq, PartialEq)]
pub struct Lot {
    #[n(0)]
    pub key: String,
    #[n(1)]
    pub product_id: String,
    #[n(2)]
    pub name: String,
    #[n(3)]
    pub owner: String,
    #[n(4)]
    pub value: String,
    #[n(5)]
    pub quantity: u32,
    #[n(6)]
    pub expiration_date: String,
    #[n(7)]
    pub manufactured_date: String,
    #[n(8)]
    pub status: LotStatus,
    #[n(9)]
    pub issue_date: String,
    #[n(10)]
    pub last_update: String,
    #[n(11)]
    pub supplier: String,
    #[n(12)]
    pub demander: String,
}

/// Caller-supplied fields for a new lot, minus the storage key and the
/// update stamp that the service fills in.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct LotDraft {
    pub product_id: String,
    pub name: String,
    pub owner: String,
    pub value: String,
    pub quantity: u32,
    pub expiration_date: String,
    pub manufactured_date: String,
    pub status: LotStatus,
    pub issue_date: String,
    pub supplier: String,
    pub demander: String,
}

impl LotDraft {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_product_id(mut self, product_id: &str) -> Self {
        self.product_id = product_id.to_owned();
        self
    }
    pub fn set_name(mut self, name: &str) -> Self {
        self.name = name.to_owned();
        self
    }
    pub fn set_owner(mut self, owner: &str) -> Self {
        self.owner = owner.to_owned();
        self
    }
    pub fn set_value(mut self, value: &str) -> Self {
        self.value = value.to_owned();
        self
    }
    pub fn set_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }
    pub fn set_expiration_date(mut self, date: &str) -> Self {
        self.expiration_date = date.to_owned();
        self
    }
    pub fn set_manufactured_date(mut self, date: &str) -> Self {
        self.manufactured_date = date.to_owned();
        self
    }
    pub fn set_status(mut self, status: LotStatus) -> Self {
        self.status = status;
        self
    }
    pub fn set_issue_date(mut self, date: &str) -> Self {
        self.issue_date = date.to_owned();
        self
    }
    pub fn set_supplier(mut self, supplier: &str) -> Self {
        self.supplier = supplier.to_owned();
        self
    }
    pub fn set_demander(mut self, demander: &str) -> Self {
        self.demander = demander.to_owned();
        self
    }

    pub(crate) fn into_lot(self, key: &str, last_update: String) -> Lot {
        Lot {
            key: key.to_owned(),
            product_id: self.product_id,
            name: self.name,
            owner: self.owner,
            value: self.value,
            quantity: self.quantity,
            expiration_date: self.expiration_date,
            manufactured_date: self.manufactured_date,
            status: self.status,
            issue_date: self.issue_date,
            last_update,
            supplier: self.supplier,
            demander: self.demander,
        }
    }
}

/// Composite key for a freshly purchased lot: `owner_name_issueDate`.
///
/// Components must not contain the separator; derivation rejects them
/// instead of escaping, so a derived key always splits back into exactly
/// three components.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LotKey(String);

impl LotKey {
    pub fn derive(owner: &str, name: &str, issue_date: &str) -> Result<Self, TransferError> {
        for (label, component) in [
            ("owner", owner),
            ("name", name),
            ("issue date", issue_date),
        ] {
            if component.contains(KEY_SEPARATOR) {
                return Err(TransferError::invalid(format!(
                    "{label} \"{component}\" contains the key separator '{KEY_SEPARATOR}'"
                )));
            }
        }
        Ok(Self(format!(
            "{owner}{KEY_SEPARATOR}{name}{KEY_SEPARATOR}{issue_date}"
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for LotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Stamp recorded on every mutation, in the ledger's dd.MM.yyyy HH:mm:ss layout.
pub(crate) fn now_stamp() -> String {
    Utc::now().format("%d.%m.%Y %H:%M:%S").to_string()
}
