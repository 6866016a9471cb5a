use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::Value;

/// Source of the index used when a generated foreign key has to be replaced.
pub trait IdSelector: Send {
    /// Pick an index in `0..len`; `len` is never zero.
    fn select(&mut self, len: usize) -> usize;
}

/// Uniform random selection backed by ChaCha8.
#[derive(Debug, Clone)]
pub struct RandomSelector {
    rng: ChaCha8Rng,
}

impl RandomSelector {
    /// Reproducible selector for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Selector seeded from the thread-local generator.
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }
}

impl IdSelector for RandomSelector {
    fn select(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}

/// Keep `value` when it names one of `ids`, otherwise substitute a selected id.
///
/// `ids` must not be empty.
pub fn repair_foreign_key(
    value: Option<&Value>,
    ids: &[&str],
    selector: &mut dyn IdSelector,
) -> Value {
    if let Some(current) = value.and_then(id_text) {
        if ids.contains(&current.as_str()) {
            return Value::String(current);
        }
    }
    let index = selector.select(ids.len()).min(ids.len() - 1);
    Value::String(ids[index].to_string())
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixed(usize);

    impl IdSelector for Fixed {
        fn select(&mut self, _len: usize) -> usize {
            self.0
        }
    }

    #[test]
    fn keeps_known_ids_and_replaces_unknown_ones() {
        let ids = ["a", "b"];
        let mut selector = Fixed(1);

        assert_eq!(repair_foreign_key(Some(&json!("a")), &ids, &mut selector), json!("a"));
        assert_eq!(repair_foreign_key(Some(&json!("zzz")), &ids, &mut selector), json!("b"));
        assert_eq!(repair_foreign_key(None, &ids, &mut selector), json!("b"));
        assert_eq!(repair_foreign_key(Some(&json!(null)), &ids, &mut selector), json!("b"));
    }

    #[test]
    fn numeric_ids_match_their_text_form() {
        let ids = ["42"];
        assert_eq!(
            repair_foreign_key(Some(&json!(42)), &ids, &mut Fixed(0)),
            json!("42")
        );
    }

    #[test]
    fn out_of_range_selection_is_clamped() {
        let ids = ["a", "b"];
        assert_eq!(repair_foreign_key(None, &ids, &mut Fixed(9)), json!("b"));
    }

    #[test]
    fn seeded_selector_is_reproducible() {
        let mut a = RandomSelector::seeded(7);
        let mut b = RandomSelector::seeded(7);
        let picks_a: Vec<usize> = (0..16).map(|_| a.select(5)).collect();
        let picks_b: Vec<usize> = (0..16).map(|_| b.select(5)).collect();
        assert_eq!(picks_a, picks_b);
        assert!(picks_a.iter().all(|pick| *pick < 5));
    }
}
