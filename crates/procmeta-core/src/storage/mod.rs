pub mod index;
pub mod records;
pub mod review;
pub mod sources;
