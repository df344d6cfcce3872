//! Record identifiers: `<prefix>_<ulid>` in lowercase.

use ulid::Ulid;

pub const PROJECT_ID_PREFIX: &str = "p";
pub const TASK_ID_PREFIX: &str = "t";

/// A fresh identifier with the given prefix.
pub fn generate(prefix: &str) -> String {
    format!("{prefix}_{}", Ulid::new().to_string().to_lowercase())
}

/// A fresh identifier that `taken` does not claim.
pub fn generate_unique(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let candidate = generate(prefix);
        if !taken(&candidate) {
            return candidate;
        }
        tracing::debug!(%candidate, "id collision, drawing again");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashSet;

    #[test]
    fn test_generate_shape() {
        let id = generate(PROJECT_ID_PREFIX);
        assert!(id.starts_with("p_"));
        assert_eq!(id.len(), 2 + 26);
        assert_eq!(id, id.to_lowercase());
    }

    #[test]
    fn test_rapid_generation_is_unique() {
        let ids: HashSet<String> = (0..2000).map(|_| generate(TASK_ID_PREFIX)).collect();
        assert_eq!(ids.len(), 2000);
    }

    #[test]
    fn test_generate_unique_redraws() {
        let calls = Cell::new(0);
        let id = generate_unique(TASK_ID_PREFIX, |_| {
            calls.set(calls.get() + 1);
            calls.get() < 3
        });
        assert!(id.starts_with("t_"));
        assert_eq!(calls.get(), 3);
    }
}
