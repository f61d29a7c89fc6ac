//! `SeaORM` entity definitions.

pub mod payments;

pub use payments::Entity as Payments;
