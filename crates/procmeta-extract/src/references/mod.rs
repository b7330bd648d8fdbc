pub mod parser;
pub mod partition;

pub use parser::ReferenceParser;
pub use partition::{Partition, Segment, partition};
