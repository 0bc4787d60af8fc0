pub mod capture;
pub mod update;
