// File: ./src/model/mod.rs
pub mod bucket;
pub mod format;
pub mod item;
pub mod parser;

pub use bucket::{BucketKind, DateBucket, bucket, compare_tasks, sort_tasks};
pub use format::DateFormat;
pub use item::{AnnotatedTask, Priority, RawTask, TaskLink};
pub use parser::{AnnotateOptions, annotate, annotate_task};
