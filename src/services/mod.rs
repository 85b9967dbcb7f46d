//! Business logic services

pub mod columns;
pub mod conflicts;
pub mod detect;
pub mod gateway;
pub mod normalize;
pub mod pipeline;
pub mod processors;
pub mod report;
pub mod status;
pub mod tokenizer;
