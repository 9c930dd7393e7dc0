//! Walks the element tree for bank statement sections and builds the
//! account and transactions of each.

use chrono::NaiveDateTime;
use outlay_core::{Account, AccountId, AccountType, Money, Transaction, TransactionType};
use thiserror::Error;

use super::decode::{self, FallbackLog};
use super::diagnostics::{DroppedTransaction, FieldFallback, ImportDiagnostics, OfxField};
use super::error::OfxError;
use super::tree::XmlElement;
use super::OfxImport;

pub mod tags {
    pub const STMTTRNRS: &str = "STMTTRNRS";
    pub const STMTRS: &str = "STMTRS";
    pub const CURDEF: &str = "CURDEF";
    pub const BANKACCTFROM: &str = "BANKACCTFROM";
    pub const ACCTID: &str = "ACCTID";
    pub const ACCTTYPE: &str = "ACCTTYPE";
    pub const BANKTRANLIST: &str = "BANKTRANLIST";
    pub const STMTTRN: &str = "STMTTRN";
    pub const TRNTYPE: &str = "TRNTYPE";
    pub const DTPOSTED: &str = "DTPOSTED";
    pub const TRNAMT: &str = "TRNAMT";
    pub const FITID: &str = "FITID";
    pub const NAME: &str = "NAME";
    pub const MEMO: &str = "MEMO";
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("<{0}> holds nested elements instead of a value")]
    NestedValue(&'static str),
}

pub fn extract(root: &XmlElement) -> Result<OfxImport, OfxError> {
    let sections: Vec<&XmlElement> = root
        .self_and_descendants()
        .filter(|el| el.is(tags::STMTTRNRS))
        .collect();
    if sections.is_empty() {
        return Err(OfxError::NoStatements);
    }

    let mut transactions = Vec::new();
    let mut diagnostics = ImportDiagnostics::default();

    for (section, stmttrnrs) in sections.iter().enumerate() {
        let Some(stmtrs) = stmttrnrs.first_descendant(tags::STMTRS) else {
            tracing::debug!(section, "statement section without STMTRS skipped");
            continue;
        };

        let mut log = FallbackLog::new(None);
        let account = build_account(stmtrs, &mut log);
        diagnostics.fallbacks.extend(log.into_entries());

        let Some(list) = stmtrs.first_descendant(tags::BANKTRANLIST) else {
            tracing::debug!(section, "statement without BANKTRANLIST skipped");
            continue;
        };

        for (index, trn) in list.children_named(tags::STMTTRN).enumerate() {
            let fit_id = trn.child(tags::FITID).map(XmlElement::text);
            match build_transaction(trn, &account, fit_id.as_deref()) {
                Ok((transaction, fallbacks)) => {
                    transactions.push(transaction);
                    diagnostics.fallbacks.extend(fallbacks);
                }
                Err(e) => {
                    tracing::warn!(section, index, fit_id = ?fit_id, "dropping transaction: {e}");
                    diagnostics.dropped.push(DroppedTransaction {
                        section,
                        index,
                        fit_id,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    Ok(OfxImport {
        transactions,
        diagnostics,
        sections: sections.len(),
    })
}

/// Account identity comes from `BANKACCTFROM` when the statement has one,
/// otherwise from anywhere under `STMTRS`. `CURDEF` is always a direct child.
fn build_account(stmtrs: &XmlElement, log: &mut FallbackLog<'_>) -> Account {
    let currency = stmtrs
        .child(tags::CURDEF)
        .map(XmlElement::text)
        .unwrap_or_default();
    let scope = stmtrs.first_descendant(tags::BANKACCTFROM).unwrap_or(stmtrs);
    let acctid = scope.first_descendant(tags::ACCTID).map(XmlElement::text);
    let accttype = scope.first_descendant(tags::ACCTTYPE).map(XmlElement::text);

    Account {
        currency,
        account_id: log.decode(OfxField::AccountId, acctid.as_deref(), decode::account_id, AccountId(0)),
        account_type: log.decode(
            OfxField::AccountType,
            accttype.as_deref(),
            decode::account_type,
            AccountType::Other,
        ),
    }
}

fn build_transaction(
    trn: &XmlElement,
    account: &Account,
    fit_id: Option<&str>,
) -> Result<(Transaction, Vec<FieldFallback>), TransactionError> {
    let value = |tag: &'static str| -> Result<Option<String>, TransactionError> {
        match trn.child(tag) {
            None => Ok(None),
            Some(el) if el.has_elements() => Err(TransactionError::NestedValue(tag)),
            Some(el) => Ok(Some(el.text())),
        }
    };

    let trntype = value(tags::TRNTYPE)?;
    let dtposted = value(tags::DTPOSTED)?;
    let trnamt = value(tags::TRNAMT)?;
    let id = value(tags::FITID)?.unwrap_or_default();
    let name = value(tags::NAME)?.unwrap_or_default();
    let memo = value(tags::MEMO)?.unwrap_or_default();

    let mut log = FallbackLog::new(fit_id);
    let transaction = Transaction {
        date: log.decode(OfxField::DatePosted, dtposted.as_deref(), decode::date, NaiveDateTime::MIN),
        id,
        amount: log.decode(OfxField::Amount, trnamt.as_deref(), decode::amount, Money::zero()),
        transaction_type: log.decode(
            OfxField::TransactionType,
            trntype.as_deref(),
            decode::transaction_type,
            TransactionType::Unknown,
        ),
        name,
        memo,
        account: account.clone(),
        category: None,
    };

    Ok((transaction, log.into_entries()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ofx::tree::parse_document;

    fn run(xml: &str) -> OfxImport {
        extract(&parse_document(xml).unwrap()).unwrap()
    }

    const TRN: &str = "<STMTTRN><TRNTYPE>CREDIT</TRNTYPE><DTPOSTED>20250428</DTPOSTED>\
                       <TRNAMT>1.00</TRNAMT><FITID>A</FITID></STMTTRN>";

    #[test]
    fn no_section_is_an_error() {
        let root = parse_document("<OFX><BANKMSGSRSV1/></OFX>").unwrap();
        assert_eq!(extract(&root).unwrap_err(), OfxError::NoStatements);
    }

    #[test]
    fn section_without_stmtrs_contributes_nothing() {
        let out = run("<OFX><STMTTRNRS><TRNUID>1</TRNUID></STMTTRNRS></OFX>");
        assert!(out.transactions.is_empty());
        assert_eq!(out.sections, 1);
    }

    #[test]
    fn statement_without_list_contributes_nothing() {
        let out = run("<OFX><STMTTRNRS><STMTRS><CURDEF>USD</CURDEF></STMTRS></STMTTRNRS></OFX>");
        assert!(out.transactions.is_empty());
    }

    #[test]
    fn root_can_be_the_section() {
        let xml = format!("<STMTTRNRS><STMTRS><BANKTRANLIST>{TRN}</BANKTRANLIST></STMTRS></STMTTRNRS>");
        assert_eq!(run(&xml).transactions.len(), 1);
    }

    #[test]
    fn account_prefers_bankacctfrom() {
        let xml = format!(
            "<OFX><STMTTRNRS><STMTRS><CURDEF>EUR</CURDEF>\
             <OTHER><ACCTID>1</ACCTID></OTHER>\
             <BANKACCTFROM><ACCTID>2</ACCTID><ACCTTYPE>savings</ACCTTYPE></BANKACCTFROM>\
             <BANKTRANLIST>{TRN}</BANKTRANLIST></STMTRS></STMTTRNRS></OFX>"
        );
        let account = &run(&xml).transactions[0].account;
        assert_eq!(account.currency, "EUR");
        assert_eq!(account.account_id, AccountId(2));
        assert_eq!(account.account_type, AccountType::Savings);
    }

    #[test]
    fn bankacctfrom_without_acctid_does_not_look_elsewhere() {
        let xml = format!(
            "<OFX><STMTTRNRS><STMTRS><OTHER><ACCTID>1</ACCTID></OTHER>\
             <BANKACCTFROM><ACCTTYPE>CHECKING</ACCTTYPE></BANKACCTFROM>\
             <BANKTRANLIST>{TRN}</BANKTRANLIST></STMTRS></STMTTRNRS></OFX>"
        );
        let out = run(&xml);
        let account = &out.transactions[0].account;
        assert_eq!(account.account_id, AccountId(0));
        assert_eq!(account.account_type, AccountType::Checking);
        assert_eq!(out.diagnostics.fallback_count(OfxField::AccountId), 1);
        assert_eq!(out.diagnostics.fallback_count(OfxField::AccountType), 0);
    }

    #[test]
    fn account_falls_back_to_stmtrs() {
        let xml = format!(
            "<OFX><STMTTRNRS><STMTRS><CCACCT><ACCTID>77</ACCTID><ACCTTYPE>CREDITLINE</ACCTTYPE></CCACCT>\
             <BANKTRANLIST>{TRN}</BANKTRANLIST></STMTRS></STMTTRNRS></OFX>"
        );
        let out = run(&xml);
        let account = &out.transactions[0].account;
        assert_eq!(account.account_id, AccountId(77));
        assert_eq!(account.account_type, AccountType::Creditline);
        assert_eq!(account.currency, "");
    }

    #[test]
    fn curdef_must_be_a_direct_child() {
        let xml = format!(
            "<OFX><STMTTRNRS><STMTRS><BANKACCTFROM><CURDEF>USD</CURDEF></BANKACCTFROM>\
             <BANKTRANLIST>{TRN}</BANKTRANLIST></STMTRS></STMTTRNRS></OFX>"
        );
        assert_eq!(run(&xml).transactions[0].account.currency, "");
    }

    #[test]
    fn missing_account_fields_are_recorded() {
        let xml = format!("<OFX><STMTTRNRS><STMTRS><BANKTRANLIST>{TRN}</BANKTRANLIST></STMTRS></STMTTRNRS></OFX>");
        let out = run(&xml);
        let account = &out.transactions[0].account;
        assert_eq!(account.account_id, AccountId(0));
        assert_eq!(account.account_type, AccountType::Other);
        assert_eq!(out.diagnostics.fallback_count(OfxField::AccountId), 1);
        assert_eq!(out.diagnostics.fallback_count(OfxField::AccountType), 1);
    }

    #[test]
    fn only_direct_children_of_the_list_count() {
        let xml = format!(
            "<OFX><STMTTRNRS><STMTRS><BANKTRANLIST>{TRN}<WRAP>{TRN}</WRAP></BANKTRANLIST>\
             </STMTRS></STMTTRNRS></OFX>"
        );
        assert_eq!(run(&xml).transactions.len(), 1);
    }

    #[test]
    fn each_section_keeps_its_own_account() {
        let section = |id: u32| {
            format!(
                "<STMTTRNRS><STMTRS><BANKACCTFROM><ACCTID>{id}</ACCTID></BANKACCTFROM>\
                 <BANKTRANLIST>{TRN}</BANKTRANLIST></STMTRS></STMTTRNRS>"
            )
        };
        let xml = format!("<OFX>{}{}</OFX>", section(10), section(20));
        let out = run(&xml);
        assert_eq!(out.sections, 2);
        assert_eq!(out.transactions[0].account.account_id, AccountId(10));
        assert_eq!(out.transactions[1].account.account_id, AccountId(20));
    }

    #[test]
    fn undecodable_fields_fall_back() {
        let xml = "<OFX><STMTTRNRS><STMTRS><BANKTRANLIST><STMTTRN>\
                   <TRNTYPE>XFER</TRNTYPE><DTPOSTED>yesterday</DTPOSTED><TRNAMT>lots</TRNAMT>\
                   <FITID>F1</FITID></STMTTRN></BANKTRANLIST></STMTRS></STMTTRNRS></OFX>";
        let out = run(xml);
        let tx = &out.transactions[0];
        assert_eq!(tx.transaction_type, TransactionType::Unknown);
        assert_eq!(tx.date, NaiveDateTime::MIN);
        assert!(tx.amount.is_zero());
        assert_eq!(tx.name, "");
        assert_eq!(tx.memo, "");
        assert_eq!(out.diagnostics.fallback_count(OfxField::DatePosted), 1);
        assert_eq!(out.diagnostics.fallback_count(OfxField::Amount), 1);
        assert_eq!(out.diagnostics.fallback_count(OfxField::TransactionType), 1);
        assert!(out
            .diagnostics
            .fallbacks
            .iter()
            .filter(|f| f.field == OfxField::Amount)
            .all(|f| f.fit_id.as_deref() == Some("F1") && f.raw.as_deref() == Some("lots")));
    }

    #[test]
    fn nested_value_drops_only_that_transaction() {
        let bad = "<STMTTRN><TRNAMT><X>1</X></TRNAMT><FITID>BAD</FITID></STMTTRN>";
        let xml = format!(
            "<OFX><STMTTRNRS><STMTRS><BANKTRANLIST>{TRN}{bad}{TRN}</BANKTRANLIST></STMTRS></STMTTRNRS></OFX>"
        );
        let out = run(&xml);
        assert_eq!(out.transactions.len(), 2);
        assert_eq!(out.diagnostics.dropped.len(), 1);
        let dropped = &out.diagnostics.dropped[0];
        assert_eq!(dropped.index, 1);
        assert_eq!(dropped.fit_id.as_deref(), Some("BAD"));
        assert_eq!(dropped.reason, "<TRNAMT> holds nested elements instead of a value");
    }

    #[test]
    fn first_duplicate_field_wins() {
        let xml = "<OFX><STMTTRNRS><STMTRS><BANKTRANLIST><STMTTRN>\
                   <NAME>first</NAME><NAME>second</NAME></STMTTRN>\
                   </BANKTRANLIST></STMTRS></STMTTRNRS></OFX>";
        assert_eq!(run(xml).transactions[0].name, "first");
    }
}
