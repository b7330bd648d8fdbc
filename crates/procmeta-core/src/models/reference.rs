use serde::{Deserialize, Serialize};

/// A bibliography entry. Sequence numbers are 1-based and contiguous within a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub ref_seq_no: u32,
    pub ref_text: String,
}
