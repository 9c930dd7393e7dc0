use thiserror::Error;

use super::header::HeaderIssue;
use super::sgml::MalformedLine;
use super::tree::XmlError;

/// Where in the import pipeline processing stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    Start,
    HeaderCheck,
    Transcode,
    XmlParse,
    Extract,
    Done,
}

/// Why an import failed. The `Display` text is meant to be shown to the
/// user as-is; details for logs are carried in the variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OfxError {
    #[error("Input is empty.")]
    EmptyInput,
    #[error("Invalid OFX format.")]
    MissingRoot,
    #[error("Unsupported OFX format.")]
    UnsupportedHeader(HeaderIssue),
    #[error("Failed to preprocess SGML to XML.")]
    Preprocess(#[source] MalformedLine),
    #[error("Parsing failed: {0}.")]
    Xml(#[from] XmlError),
    #[error("No STMTTRNRS section found.")]
    NoStatements,
}

impl OfxError {
    pub fn stage(&self) -> ParseStage {
        match self {
            OfxError::EmptyInput => ParseStage::Start,
            OfxError::MissingRoot | OfxError::UnsupportedHeader(_) => ParseStage::HeaderCheck,
            OfxError::Preprocess(_) => ParseStage::Transcode,
            OfxError::Xml(_) => ParseStage::XmlParse,
            OfxError::NoStatements => ParseStage::Extract,
        }
    }
}
