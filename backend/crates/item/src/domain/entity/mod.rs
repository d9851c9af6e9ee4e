pub mod category;
pub mod claim;
pub mod comment;
pub mod item;
pub mod report;
