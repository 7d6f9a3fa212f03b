mod ad;

pub use ad::{AdSummaryRow, AdWithAuthor};
