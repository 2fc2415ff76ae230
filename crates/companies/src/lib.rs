//! Companies and their industry classifications.

pub mod company;
pub mod industry;
pub mod slug;

pub use company::{Company, CompanySummary, CompanyUpdate, NewCompany};
pub use industry::{CompanyIndustry, Industry, IndustrySummary, NewIndustry};
pub use slug::slugify;
