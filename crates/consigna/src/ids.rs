use chrono::{Local, NaiveDateTime};

/// Source of fresh entity identifiers, called once per new record.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random version 4 UUIDs in canonical hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4Generator;

impl IdGenerator for UuidV4Generator {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Wall-clock seam so timestamps can be pinned in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
