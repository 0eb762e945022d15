pub mod dedup;
pub mod extract;
pub mod run;
pub mod simulate;
pub mod stats;
