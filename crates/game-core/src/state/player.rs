use std::fmt;

/// A participant in exactly one game.
///
/// Players are created during the waiting phase with [`Role::Unknown`]; the
/// real role is assigned exactly once at game start. The liveness flag flips
/// alive -> dead at most once and never back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub alive: bool,
}

impl Player {
    /// Creates a new player. New players start alive with an unknown role.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: Role::Unknown,
            alive: true,
        }
    }
}

/// Closed set of player roles.
///
/// The `Display` forms are part of the external wire contract and must not
/// change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Unknown,
    Villager,
    Mafia,
    Doctor,
    Sheriff,
}

impl Role {
    /// Stable wire string for this role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Unknown => "unknown",
            Role::Villager => "villager",
            Role::Mafia => "mafia",
            Role::Doctor => "doctor",
            Role::Sheriff => "sheriff",
        }
    }

    pub fn is_mafia_team(self) -> bool {
        self == Role::Mafia
    }

    pub fn is_village_team(self) -> bool {
        matches!(self, Role::Villager | Role::Doctor | Role::Sheriff)
    }

    pub fn has_night_action(self) -> bool {
        matches!(self, Role::Mafia | Role::Doctor | Role::Sheriff)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_players_start_alive_and_unassigned() {
        let player = Player::new("player-1", "Gilbert McDonald");
        assert!(player.alive);
        assert_eq!(player.role, Role::Unknown);
    }

    #[test]
    fn team_predicates() {
        assert!(Role::Mafia.is_mafia_team());
        assert!(!Role::Mafia.is_village_team());

        for role in [Role::Villager, Role::Doctor, Role::Sheriff] {
            assert!(role.is_village_team());
            assert!(!role.is_mafia_team());
        }

        assert!(!Role::Unknown.is_mafia_team());
        assert!(!Role::Unknown.is_village_team());
    }

    #[test]
    fn night_action_roles() {
        assert!(Role::Mafia.has_night_action());
        assert!(Role::Doctor.has_night_action());
        assert!(Role::Sheriff.has_night_action());
        assert!(!Role::Villager.has_night_action());
        assert!(!Role::Unknown.has_night_action());
    }

    #[test]
    fn wire_strings_are_stable() {
        assert_eq!(Role::Unknown.to_string(), "unknown");
        assert_eq!(Role::Villager.to_string(), "villager");
        assert_eq!(Role::Mafia.to_string(), "mafia");
        assert_eq!(Role::Doctor.to_string(), "doctor");
        assert_eq!(Role::Sheriff.to_string(), "sheriff");
    }
}
