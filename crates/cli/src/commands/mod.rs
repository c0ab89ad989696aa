pub mod check;
pub mod storages;
