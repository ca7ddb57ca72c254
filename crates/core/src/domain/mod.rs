pub mod analysis;
pub mod portfolio;
