pub mod author;
pub mod category;
pub mod concept;
pub mod record;
pub mod reference;

pub use author::Author;
pub use category::Category;
pub use concept::{ConceptAssignment, ConceptPath};
pub use record::DocumentRecord;
pub use reference::Reference;
