//! Id minting helpers.

/// Generates a record id for a newly committed book.
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Generates a short correlation token for one pipeline invocation.
///
/// Operation ids are for tracing only, never a business key, so a 12-hex-char
/// prefix of a v4 UUID is plenty.
pub fn new_operation_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..12].to_string()
}
