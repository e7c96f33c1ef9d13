pub mod agent_loop;
pub mod error;
pub mod system_prompt;

pub use agent_loop::{Agent, AgentSettings, MAX_TOOL_ITERATIONS};
pub use error::{AgentError, ProtocolViolation};
pub use system_prompt::{default_system_prompt, host_shell, SYSTEM_PROMPT};
