pub mod aggregate;
pub mod detect;
pub mod engine;
pub mod export;
pub mod fields;
pub mod io;
pub mod report;
pub mod sink;
pub mod table;

pub mod prelude {
    pub use crate::detect::Threshold;
    pub use crate::engine::{AnalysisReport, Analyzer};
    pub use crate::fields::FieldLayout;
    pub use crate::table::FrequencyTable;
}
