//! Document parser implementations

mod pdf;
mod plain_text;

#[cfg(test)]
pub(crate) use pdf::fixtures;
pub use pdf::PdfParser;
pub use plain_text::PlainTextParser;
