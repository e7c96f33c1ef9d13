use std::io;
use std::process::ExitCode;

use ai_shell::agent::default_system_prompt;
use ai_shell::cli::{request_from_args, Console, FrontEnd, HostShell};
use ai_shell::{config, logging, Agent, Config, ToolRegistry};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let request = request_from_args(std::env::args().skip(1));
    let mut front_end = FrontEnd::new(Console::new(), io::stdin().lock(), HostShell::new());

    // Nothing to do: bail before logging, credentials or the network
    if let Some(outcome) = front_end.reject_empty(&request) {
        return ExitCode::from(outcome.exit_code());
    }

    // Logging is best effort
    if let Err(e) = logging::init_logging(&config::log_dir()) {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    let agent = match Config::from_env().and_then(|config| {
        let provider = config.build_provider()?;
        Ok(Agent::new(provider, ToolRegistry::new(), config.agent))
    }) {
        Ok(agent) => agent,
        Err(e) => {
            tracing::error!("Configuration error: {:#}", e);
            front_end.console_mut().print_error(&format!("{:#}", e));
            return ExitCode::FAILURE;
        }
    };

    let outcome = front_end
        .run(&agent, &default_system_prompt(), &request)
        .await;
    tracing::info!("Finished: {:?}", outcome);

    ExitCode::from(outcome.exit_code())
}
