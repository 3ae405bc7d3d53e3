mod record;

pub use record::{NewRecord, Record};
