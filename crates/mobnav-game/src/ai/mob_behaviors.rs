//! Per-mob-type behavior lists.

use super::behavior::Behavior;
use super::behaviors::*;
use super::brain::GoalSelector;
use super::pathfinding::PathfindingConfig;

/// Block zombies pillar up with.
const BUILD_BLOCK: u32 = 4; // cobblestone

/// Create the behavior list for a given mob type, highest priority first.
pub fn create_behaviors(type_id: &str, search: PathfindingConfig) -> Vec<Box<dyn Behavior>> {
    match type_id {
        "minecraft:zombie" => vec![
            Box::new(Float::new()),
            Box::new(BuildUp::new(BUILD_BLOCK)),
            Box::new(MeleeAttack::new(20, search)),
            Box::new(RandomStroll::new()),
            Box::new(LookAtPlayer::new(8.0)),
        ],
        "minecraft:skeleton" => vec![
            Box::new(Float::new()),
            Box::new(MeleeAttack::new(20, search)),
            Box::new(RandomStroll::new()),
            Box::new(LookAtPlayer::new(8.0)),
        ],
        "minecraft:cow" | "minecraft:pig" | "minecraft:chicken" => vec![
            Box::new(Float::new()),
            Box::new(Panic::new()),
            Box::new(RandomStroll::new()),
            Box::new(LookAtPlayer::new(8.0)),
        ],
        _ => vec![
            Box::new(RandomStroll::new()),
            Box::new(LookAtPlayer::new(8.0)),
        ],
    }
}

/// A ready-to-insert selector for a mob type.
pub fn create_selector(type_id: &str, search: PathfindingConfig) -> GoalSelector {
    GoalSelector::new(create_behaviors(type_id, search))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(type_id: &str) -> Vec<&'static str> {
        create_selector(type_id, PathfindingConfig::default()).names()
    }

    #[test]
    fn zombie_builds_before_chasing() {
        assert_eq!(
            names("minecraft:zombie"),
            vec!["float", "build_up", "melee_attack", "random_stroll", "look_at_player"]
        );
    }

    #[test]
    fn cow_is_passive() {
        let cow = names("minecraft:cow");
        assert!(cow.contains(&"panic"));
        assert!(!cow.contains(&"melee_attack"));
        assert_eq!(cow.len(), 4);
    }

    #[test]
    fn float_comes_first() {
        for type_id in ["minecraft:zombie", "minecraft:skeleton", "minecraft:pig"] {
            assert_eq!(names(type_id)[0], "float");
        }
    }

    #[test]
    fn unknown_gets_default_behaviors() {
        assert_eq!(names("minecraft:unknown").len(), 2);
    }
}
