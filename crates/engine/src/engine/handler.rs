use tracing::debug;

use super::command::Command;
use crate::events::EventPayload;

/// Maps an inbound agent intent to the command that applies it.
///
/// Returns `None` for intents that are accepted but deliberately ignored
/// (`player_thoughts` exists purely so agent reasoning lands on the log).
/// Engine-emitted kinds never reach this point; the codec rejects them.
pub fn command_for_event(payload: EventPayload) -> Option<Command> {
    match payload {
        EventPayload::VoteSubmitted { voter, target } => Some(Command::Vote { voter, target }),
        EventPayload::AllChat { sender, message } => Some(Command::Chat { sender, message }),
        EventPayload::MafiaChat { sender, message } => {
            Some(Command::MafiaChat { sender, message })
        }
        EventPayload::NightAction {
            role,
            actor,
            target,
        } => Some(Command::NightAction {
            role,
            actor,
            target,
        }),
        EventPayload::PlayerThoughts { sender, .. } => {
            debug!(sender = %sender, "player thoughts received, no action taken");
            None
        }
        other => {
            debug!(kind = other.kind(), "ignoring engine-emitted event kind");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intents_map_to_commands() {
        let cmd = command_for_event(EventPayload::VoteSubmitted {
            voter: "player-1".into(),
            target: "player-2".into(),
        });
        assert_eq!(
            cmd,
            Some(Command::Vote {
                voter: "player-1".into(),
                target: "player-2".into(),
            })
        );

        let cmd = command_for_event(EventPayload::NightAction {
            role: "doctor".into(),
            actor: "player-3".into(),
            target: "player-3".into(),
        });
        assert_eq!(
            cmd,
            Some(Command::NightAction {
                role: "doctor".into(),
                actor: "player-3".into(),
                target: "player-3".into(),
            })
        );
    }

    #[test]
    fn player_thoughts_are_a_no_op() {
        let cmd = command_for_event(EventPayload::PlayerThoughts {
            sender: "player-5".into(),
            thought: "I trust nobody".into(),
        });
        assert_eq!(cmd, None);
    }
}
