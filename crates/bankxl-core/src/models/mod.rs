//! Data models for statements and pipeline configuration.

pub mod config;
pub mod statement;

pub use config::{BankxlConfig, DecrypterKind, LayoutConfig, OutputConfig, ToolConfig};
pub use statement::{
    Bank, CropRegion, ExtractionOptions, Office, RawTable, Row, Statement, Table,
    WorkaroundFlags, NBC_CROP_REGION,
};
