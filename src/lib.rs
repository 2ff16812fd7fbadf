pub mod cli;
pub mod config;
pub mod eligibility;
pub mod engine;
pub mod extract;
pub mod input;
pub mod normalize;
pub mod pipeline;
pub mod probe;
pub mod record;
pub mod report;
pub mod util;
