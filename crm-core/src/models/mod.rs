mod ancillary;
mod counts;
mod customer;
mod estimate;

pub use ancillary::{Fleet, NewFleet, NewReferralSource, NewTag, ReferralSource, Tag};
pub use counts::{StageCount, WorkflowCounts};
pub use customer::{
    Customer, CustomerAddress, NewCustomer, PaymentTerms, PhoneEntry, PhoneType, PreferredContact,
};
pub use estimate::{Estimate, WorkflowStage};
