pub mod book;
pub mod category;
pub mod error;
pub mod id;

pub use book::BookDraft;
pub use category::Category;
pub use error::{CoreError, ErrorCategory, Result};
pub use id::{new_operation_id, new_record_id};
