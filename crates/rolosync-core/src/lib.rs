pub mod domain;
pub mod reconcile;
pub mod report;

pub use domain::*;
pub use reconcile::*;
pub use report::RunReport;
