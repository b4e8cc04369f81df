use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Source of question ids, passed explicitly to whoever needs fresh ones.
pub trait IdGenerator {
    fn next_id(&mut self, prefix: &str) -> String;
}

/// `prefix_xxxxxxx` with a random lower-case alphanumeric suffix.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self, prefix: &str) -> String {
        format!("{}_{}", prefix, random_token(7))
    }
}

/// `prefix_1`, `prefix_2`, ... for reproducible output.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: usize,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self { next: 1 }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, prefix: &str) -> String {
        let id = format!("{}_{}", prefix, self.next);
        self.next += 1;
        id
    }
}

pub fn random_token(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}
