pub mod customer;
pub mod debug;
pub mod facilities;
pub mod health;
pub mod metrics;
pub mod mitra;
pub mod reference;
