use thiserror::Error;
use vt_core::{AgentId, BehaviorId, StateId};

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("{agent} requested a state transition but this universe does not support transitions")]
    TransitionsUnsupported { agent: AgentId },

    #[error("{state} is not a state of {agent}")]
    UnknownState { agent: AgentId, state: StateId },

    #[error("unknown agent {0}")]
    UnknownAgent(AgentId),

    #[error("unknown behavior {0}")]
    UnknownBehavior(BehaviorId),

    #[error("agent {name:?} is already registered as {id}")]
    AlreadyRegistered { name: String, id: AgentId },

    #[error("behavior failed: {0}")]
    Custom(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl BehaviorError {
    /// Wrap an application-level failure message.
    pub fn custom(msg: impl Into<String>) -> Self {
        BehaviorError::Custom(msg.into().into())
    }
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
