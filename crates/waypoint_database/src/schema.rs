//! Diesel schema for the tables the core pipeline reads.
//!
//! The analytics tables themselves (trips, drivers, regions, ...) are reached
//! only through raw SELECT statements and are deliberately not modeled here.

diesel::table! {
    /// Human-vetted (question, SQL) pairs used as ground truth for validation.
    golden_queries (id) {
        /// Surrogate key
        id -> Int4,
        /// The reference question text
        question -> Text,
        /// The trusted SQL for that question
        sql_query -> Text,
        /// Grouping label, e.g. "revenue" or "trips"
        category -> Nullable<Text>,
        /// Whether the validator should consider this entry
        is_active -> Bool,
    }
}
