//! Material library parsing

pub mod mtl_parser;

pub use mtl_parser::MtlParser;
