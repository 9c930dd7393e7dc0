//! Decoders for OFX value micro-formats. Each returns `None` on input it
//! cannot read; [`FallbackLog`] applies the default and records it.

use chrono::{NaiveDate, NaiveDateTime};
use outlay_core::{AccountId, AccountType, Money, TransactionType};
use rust_decimal::Decimal;
use std::str::FromStr;

use super::diagnostics::{FieldFallback, OfxField};

pub fn account_id(raw: &str) -> Option<AccountId> {
    raw.trim().parse().ok().map(AccountId)
}

pub fn account_type(raw: &str) -> Option<AccountType> {
    raw.trim().parse().ok()
}

pub fn transaction_type(raw: &str) -> Option<TransactionType> {
    raw.trim().parse().ok()
}

/// Signed decimal with optional `,` thousands separators.
pub fn amount(raw: &str) -> Option<Money> {
    let s = raw.trim().replace(',', "");
    Decimal::from_str(&s).ok().map(Money::from_decimal)
}

/// `YYYYMMDD[HHMMSS][.fff][[offset:TZ]]`. The timezone annotation is dropped,
/// not applied.
pub fn date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    let s = s.find('[').map_or(s, |at| &s[..at]);
    let s = s.find('.').map_or(s, |at| &s[..at]);

    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match s.len() {
        14 => NaiveDateTime::parse_from_str(s, "%Y%m%d%H%M%S").ok(),
        8 => NaiveDate::parse_from_str(s, "%Y%m%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0)),
        _ => None,
    }
}

/// Collects the fallbacks taken while decoding one account or transaction.
pub(crate) struct FallbackLog<'a> {
    fit_id: Option<&'a str>,
    entries: Vec<FieldFallback>,
}

impl<'a> FallbackLog<'a> {
    pub(crate) fn new(fit_id: Option<&'a str>) -> Self {
        FallbackLog {
            fit_id,
            entries: Vec::new(),
        }
    }

    pub(crate) fn decode<T>(
        &mut self,
        field: OfxField,
        raw: Option<&str>,
        decode: fn(&str) -> Option<T>,
        default: T,
    ) -> T {
        if let Some(value) = raw.and_then(decode) {
            return value;
        }
        tracing::debug!(%field, raw = ?raw, fit_id = ?self.fit_id, "substituting default");
        self.entries.push(FieldFallback {
            field,
            raw: raw.map(str::to_string),
            fit_id: self.fit_id.map(str::to_string),
        });
        default
    }

    pub(crate) fn into_entries(self) -> Vec<FieldFallback> {
        self.entries
    }
}
