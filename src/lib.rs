// Core shared between the logsum binary and its tests
pub mod parser;
pub mod report;
pub mod summary;
