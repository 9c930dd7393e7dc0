use serde::Serialize;
use std::fmt;

/// Fields whose undecodable values are replaced by a documented default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OfxField {
    AccountId,
    AccountType,
    TransactionType,
    Amount,
    DatePosted,
}

impl OfxField {
    pub fn tag(self) -> &'static str {
        match self {
            OfxField::AccountId => "ACCTID",
            OfxField::AccountType => "ACCTTYPE",
            OfxField::TransactionType => "TRNTYPE",
            OfxField::Amount => "TRNAMT",
            OfxField::DatePosted => "DTPOSTED",
        }
    }
}

impl fmt::Display for OfxField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A default was substituted for `field`. `raw` is `None` when the tag was
/// absent; `fit_id` is `None` for account-level fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFallback {
    pub field: OfxField,
    pub raw: Option<String>,
    pub fit_id: Option<String>,
}

/// A `<STMTTRN>` that could not be turned into a transaction and was left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedTransaction {
    /// Zero-based position of the `STMTTRNRS` section in the document.
    pub section: usize,
    /// Zero-based position of the `STMTTRN` within its `BANKTRANLIST`.
    pub index: usize,
    pub fit_id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportDiagnostics {
    pub fallbacks: Vec<FieldFallback>,
    pub dropped: Vec<DroppedTransaction>,
}

impl ImportDiagnostics {
    pub fn fallback_count(&self, field: OfxField) -> usize {
        self.fallbacks.iter().filter(|f| f.field == field).count()
    }

    pub fn is_clean(&self) -> bool {
        self.fallbacks.is_empty() && self.dropped.is_empty()
    }
}
