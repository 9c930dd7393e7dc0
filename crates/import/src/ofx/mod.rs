//! OFX 1.x bank statement import.
//!
//! A parse runs header check, SGML repair, XML parse and extraction in that
//! order and stops at the first failing stage. Undecodable field values do not
//! fail the parse; they fall back to defaults and are reported in
//! [`ImportDiagnostics`].

pub mod decode;
pub mod diagnostics;
mod error;
pub mod extract;
pub mod header;
pub mod sgml;
pub mod tree;

#[cfg(test)]
mod builder;

use outlay_core::Transaction;
use serde::{Deserialize, Serialize};

pub use diagnostics::{DroppedTransaction, FieldFallback, ImportDiagnostics, OfxField};
pub use error::{OfxError, ParseStage};
pub use sgml::SgmlMode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseOptions {
    pub sgml_mode: SgmlMode,
}

/// Transactions in document order, every section concatenated, plus what had
/// to be defaulted or dropped on the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfxImport {
    pub transactions: Vec<Transaction>,
    pub diagnostics: ImportDiagnostics,
    /// Number of `STMTTRNRS` sections found, including ones that yielded
    /// nothing.
    pub sections: usize,
}

#[derive(Debug, Clone, Default)]
pub struct OfxParser {
    options: ParseOptions,
}

impl OfxParser {
    pub fn new(options: ParseOptions) -> Self {
        OfxParser { options }
    }

    pub fn parse(&self, text: &str) -> Result<OfxImport, OfxError> {
        let result = self.run(text);
        match &result {
            Ok(import) => tracing::debug!(
                stage = ?ParseStage::Done,
                sections = import.sections,
                transactions = import.transactions.len(),
                fallbacks = import.diagnostics.fallbacks.len(),
                dropped = import.diagnostics.dropped.len(),
                "OFX import complete"
            ),
            Err(e) => tracing::debug!(stage = ?e.stage(), error = ?e, "OFX import failed"),
        }
        result
    }

    fn run(&self, text: &str) -> Result<OfxImport, OfxError> {
        if text.trim().is_empty() {
            return Err(OfxError::EmptyInput);
        }

        let (head, body) = header::split_header(text).ok_or(OfxError::MissingRoot)?;
        if let Some(issue) = header::check(head) {
            return Err(OfxError::UnsupportedHeader(issue));
        }
        tracing::debug!(stage = ?ParseStage::Transcode, mode = ?self.options.sgml_mode);

        let xml = sgml::transcode(body, self.options.sgml_mode).map_err(OfxError::Preprocess)?;
        tracing::debug!(stage = ?ParseStage::XmlParse, bytes = xml.len());

        let root = tree::parse_document(&xml)?;
        tracing::debug!(stage = ?ParseStage::Extract, root = %root.name);

        extract::extract(&root)
    }
}

pub fn parse_str(text: &str) -> Result<OfxImport, OfxError> {
    OfxParser::default().parse(text)
}

/// Decodes `data` as UTF-8, replacing invalid sequences, and parses it.
pub fn parse(data: &[u8]) -> Result<OfxImport, OfxError> {
    let content = String::from_utf8_lossy(data);
    parse_str(&content)
}
