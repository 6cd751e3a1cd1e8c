#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The discrete actions an agent can run concurrently, one timer per kind.
///
/// Declaration order is load-bearing: the scheduler processes kinds in this
/// order each tick, and the use-before-attack sequencing (use pre-empting a
/// same-tick attack) depends on `Use` sorting first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActionKind {
    Use,
    Attack,
    Jump,
    DropOne,
    DropStack,
    SwapHands,
}

impl ActionKind {
    pub const ALL: [ActionKind; 6] = [
        ActionKind::Use,
        ActionKind::Attack,
        ActionKind::Jump,
        ActionKind::DropOne,
        ActionKind::DropStack,
        ActionKind::SwapHands,
    ];

    /// Every kind touches the world, so all are suppressed for passive
    /// (spectating) agents. The timer still advances while suppressed.
    pub fn blocked_while_passive(self) -> bool {
        match self {
            ActionKind::Use
            | ActionKind::Attack
            | ActionKind::Jump
            | ActionKind::DropOne
            | ActionKind::DropStack
            | ActionKind::SwapHands => true,
        }
    }
}
