pub mod enums;
pub mod prediction;
pub mod symptom;

pub use enums::*;
pub use prediction::*;
pub use symptom::*;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid {field} value: {value}")]
    InvalidEnum { field: String, value: String },
    #[error("Severity must be between 1 and 10, got {0}")]
    SeverityOutOfRange(u8),
}
