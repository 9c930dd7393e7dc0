//! Writes OFX 1.02 SGML the way bank exports lay it out, for fixtures.

use outlay_core::{Account, Transaction};

pub(crate) const HEADER: &str = "OFXHEADER:100
DATA:OFXSGML
VERSION:102
SECURITY:NONE
ENCODING:USASCII
CHARSET:1252
COMPRESSION:NONE
OLDFILEUID:NONE
NEWFILEUID:NONE
";

#[derive(Default)]
pub(crate) struct OfxBuilder {
    sections: Vec<String>,
    current: String,
}

impl OfxBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Starts a new `STMTTRNRS` section.
    pub(crate) fn add_section(mut self) -> Self {
        if !self.current.is_empty() {
            self.sections.push(std::mem::take(&mut self.current));
        }
        self
    }

    pub(crate) fn set_account(mut self, account: &Account) -> Self {
        self.line(4, &format!("<CURDEF>{}", account.currency));
        self.line(4, "<BANKACCTFROM>");
        self.line(5, "<BANKID>USA");
        self.line(5, &format!("<ACCTID>{}", account.account_id));
        self.line(5, &format!("<ACCTTYPE>{}", account.account_type));
        self.line(4, "</BANKACCTFROM>");
        self
    }

    pub(crate) fn add_transactions(mut self, transactions: &[Transaction]) -> Self {
        self.line(4, "<BANKTRANLIST>");
        for tx in transactions {
            self.line(5, "<STMTTRN>");
            self.line(6, &format!("<TRNTYPE>{}", tx.transaction_type));
            self.line(6, &format!("<DTPOSTED>{}", tx.date.format("%Y%m%d%H%M%S")));
            self.line(6, &format!("<TRNAMT>{}", tx.amount.as_decimal()));
            self.line(6, &format!("<FITID>{}", tx.id));
            if !tx.name.is_empty() {
                self.line(6, &format!("<NAME>{}", tx.name));
            }
            if !tx.memo.is_empty() {
                self.line(6, &format!("<MEMO>{}", tx.memo));
            }
            self.line(5, "</STMTTRN>");
        }
        self.line(4, "</BANKTRANLIST>");
        self
    }

    pub(crate) fn build(mut self) -> String {
        if !self.current.is_empty() {
            self.sections.push(std::mem::take(&mut self.current));
        }

        let mut out = String::new();
        out.push_str(HEADER);
        out.push('\n');
        out.push_str("<OFX>\n");
        out.push_str("\t<BANKMSGSRSV1>\n");
        for section in &self.sections {
            out.push_str("\t\t<STMTTRNRS>\n");
            out.push_str("\t\t\t<STMTRS>\n");
            out.push_str(section);
            out.push_str("\t\t\t</STMTRS>\n");
            out.push_str("\t\t</STMTTRNRS>\n");
        }
        out.push_str("\t</BANKMSGSRSV1>\n");
        out.push_str("</OFX>\n");
        out
    }

    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.current.push('\t');
        }
        self.current.push_str(text);
        self.current.push('\n');
    }
}
