pub mod ofx;

pub use ofx::{ImportDiagnostics, OfxError, OfxImport, OfxParser, ParseOptions, SgmlMode};

pub mod import {
    use crate::*;

    pub fn import_ofx(data: &[u8]) -> Result<OfxImport, OfxError> {
        crate::ofx::parse(data)
    }

    pub fn import_ofx_with_options(data: &[u8], options: ParseOptions) -> Result<OfxImport, OfxError> {
        let content = String::from_utf8_lossy(data);
        OfxParser::new(options).parse(&content)
    }
}
