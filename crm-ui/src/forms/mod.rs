pub mod customer;

pub use customer::{CustomerForm, PhoneDraft};
