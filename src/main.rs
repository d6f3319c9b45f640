//! lazylm - interactive terminal front end
//!
//! Reads one command per line from stdin. Model output goes to stdout and
//! logs go to stderr.

use lazy_lm::llm::load_dotenv;
use lazy_lm::{EvaluationSession, HistoryPolicy, LlmConfig, SessionError, StepOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

const HELP: &str = "Commands:
  <text>            set the problem (when none is set)
  :new <problem>    start over with a new problem
  :next             ask the model for the next step
  :step             show the current step
  :steps            list all steps so far
  :ask <question>   ask about the current step (also `? <question>`)
  :history          show questions and answers
  :refresh          go back to the first step
  :help             show this help
  :quit             exit";

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Problem(&'a str),
    New(&'a str),
    Next,
    Step,
    Steps,
    Ask(&'a str),
    History,
    Refresh,
    Help,
    Quit,
    Empty,
    Unknown(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    if let Some(question) = line.strip_prefix('?') {
        return Command::Ask(question.trim());
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Command::Problem(line);
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match name {
        "new" => Command::New(arg),
        "next" | "n" => Command::Next,
        "step" => Command::Step,
        "steps" => Command::Steps,
        "ask" => Command::Ask(arg),
        "history" => Command::History,
        "refresh" => Command::Refresh,
        "help" | "h" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ => Command::Unknown(name),
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lazy_lm=info,lazylm=info".into());
    let json = std::env::var("LAZYLM_LOG_JSON").is_ok_and(|v| v == "1");

    let layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry().with(filter).with(layer).init();
}

async fn run_command(session: &mut EvaluationSession, command: Command<'_>) -> Result<(), SessionError> {
    match command {
        Command::Problem(problem) if !session.is_initialized() => {
            session.initialize_problem(problem);
            println!("Problem set. Use :next for the first step.");
        }
        Command::Problem(_) => {
            println!("A problem is already set. Use :new <problem> to replace it or :ask <question>.");
        }
        Command::New("") | Command::Ask("") => println!("Missing argument. See :help."),
        Command::New(problem) => {
            session.initialize_problem(problem);
            println!("Problem set. Use :next for the first step.");
        }
        Command::Next => match session.advance().await? {
            StepOutcome::Step(step) => println!("{step}"),
            StepOutcome::Done => println!("Problem done. Use :refresh or :new to continue."),
        },
        Command::Step => println!("{}", session.current_step()?),
        Command::Steps => {
            let state = session.state().ok_or(SessionError::NotInitialized)?;
            for (i, step) in state.steps().iter().enumerate() {
                println!("{i:>3}. {step}");
            }
        }
        Command::Ask(question) => println!("{}", session.ask_question(question).await?),
        Command::History => {
            for pair in session.question_history().chunks(2) {
                if let [question, answer] = pair {
                    println!("Q: {question}\nA: {answer}\n");
                }
            }
        }
        Command::Refresh => {
            session.refresh_state()?;
            println!("{}", session.current_step()?);
        }
        Command::Help => println!("{HELP}"),
        Command::Unknown(name) => println!("Unknown command :{name}. See :help."),
        Command::Quit | Command::Empty => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Before logging so `.env` can set RUST_LOG
    let dotenv = load_dotenv();
    init_logging();
    match dotenv {
        Ok(Some(path)) => tracing::debug!(path = %path.display(), "Loaded .env"),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Failed to load .env"),
    }

    let config = LlmConfig::from_env();
    let llm = config.build_service()?;
    let policy = if std::env::var("LAZYLM_CLEAR_HISTORY").is_ok_and(|v| v == "1") {
        HistoryPolicy::ClearOnInitialize
    } else {
        HistoryPolicy::Preserve
    };
    let mut session = EvaluationSession::new(llm)
        .with_max_tokens(config.max_tokens)
        .with_history_policy(policy);

    tracing::info!(model = %session.model_id(), max_tokens = session.max_tokens(), "Session ready");
    println!("Enter a problem to solve (:help for commands).");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = parse_command(&line);
        if command == Command::Quit {
            break;
        }
        if let Err(e) = run_command(&mut session, command).await {
            tracing::debug!(error = %e, "Command failed");
            println!("Error: {e}");
        }
    }

    Ok(())
}
