// libs/pdc-cell/src/services/mod.rs
pub mod pdc;
pub mod sweeper;

pub use pdc::PdcService;
pub use sweeper::PdcSweeper;
