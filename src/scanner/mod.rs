// file: src/scanner/mod.rs
// description: Downloads folder scanning module exports
// reference: Internal module structure

pub mod pdf_scanner;

pub use pdf_scanner::{PdfScanner, ScannedPdf};
