use thiserror::Error;
use vt_agent::BehaviorError;
use vt_core::{AgentId, BehaviorId, CoreError, StateId};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("scenario configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("agent {name:?} is already registered with a universe")]
    AgentAlreadyRegistered { name: String },

    #[error("unknown agent {0}")]
    UnknownAgent(AgentId),

    #[error("unknown behavior {0}")]
    UnknownBehavior(BehaviorId),

    #[error("{state} is not a state of {agent}")]
    UnknownState { agent: AgentId, state: StateId },

    #[error("{agent} requested a state transition but this universe does not support transitions")]
    UnsupportedTransition { agent: AgentId },

    #[error("{behavior} failed: {source}")]
    Behavior { behavior: BehaviorId, source: BehaviorError },

    #[error("state-change hook of {agent} failed: {source}")]
    Hook { agent: AgentId, source: BehaviorError },

    #[error("agent factory {factory} failed: {source}")]
    Factory {
        factory: String,
        source:  Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("simulation run aborted: {0}")]
    RunAborted(#[source] Box<SimError>),
}

pub type SimResult<T> = Result<T, SimError>;
