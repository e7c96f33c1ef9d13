mod console;
pub mod executor;
mod front_end;

pub use console::{Console, ANSWER_LABEL, CONFIRM_PROMPT, THINKING_LABEL};
pub use executor::{CommandExecutor, HostShell};
pub use front_end::{request_from_args, FrontEnd, RunOutcome};
