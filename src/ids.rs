use uuid::Uuid;

pub trait IdGenerator: Send + Sync {
    fn next_id(&mut self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `<prefix><n>` ids, counting up from 1.
#[derive(Debug, Clone)]
pub struct SequenceIds {
    prefix: String,
    next: u64,
}

impl SequenceIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequenceIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
