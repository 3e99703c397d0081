//! Agent naming

use crate::components::{AgentKind, Name};
use rand::Rng;

/// Random given name tagged with the agent's role, e.g. "Mujo - Smuggler".
pub fn generate_name(kind: AgentKind, rng: &mut impl Rng) -> Name {
    let given = GIVEN_NAMES[rng.gen_range(0..GIVEN_NAMES.len())];
    Name(format!("{} - {}", given, kind.label()))
}

static GIVEN_NAMES: &[&str] = &[
    "Janez", "Jaka", "Andrej", "Oliver", "Mujo", "Albert", "Matevz", "Viktor", "Mason", "Maks",
    "Zdravko", "Marko", "Luka", "Charles", "Yuri", "Arnold",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_carries_role() {
        let mut rng = rand::thread_rng();
        let name = generate_name(AgentKind::Gunseller, &mut rng);
        assert!(name.0.ends_with(" - Gun Trader"));
        let given = name.0.split(" - ").next().unwrap();
        assert!(GIVEN_NAMES.contains(&given));
    }

    #[test]
    fn test_name_variety() {
        let mut rng = rand::thread_rng();
        let unique: std::collections::HashSet<_> = (0..200)
            .map(|_| generate_name(AgentKind::Villager, &mut rng).0)
            .collect();
        assert!(unique.len() > 5);
    }
}
