pub mod assignment;
pub mod crm;
pub mod scoring;
