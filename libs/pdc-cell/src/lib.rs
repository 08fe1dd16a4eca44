// libs/pdc-cell/src/lib.rs
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    CreatePdcRequest, PdcError, PdcItem, PdcSearchQuery, PdcStatus, PostDatedCheck,
};
pub use router::pdc_routes;
pub use services::{PdcService, PdcSweeper};
