// src/main.rs

use std::io::BufRead;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use exam_client::{
    AssessmentApi, HttpAssessmentApi, Route, SessionCommand, SessionRunner, SessionUpdate,
    cli::{HELP, Input, parse_input},
    config::Config,
    error::ApiError,
    models::{
        answer::AnswerSet,
        test::{Test, TestId},
    },
    render, route_for,
    session::SubmitTrigger,
    state::SessionContext,
    utils::token::{SessionToken, TokenStore},
};
use tokio::sync::mpsc;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

#[derive(Parser, Debug)]
#[command(name = "exam-client", about = "Take timed tests on the assessment platform")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a timed attempt at a test.
    Take { test_id: String },
    /// Show the graded result of a completed test.
    Result { test_id: String },
    /// Manage the stored session token.
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand, Debug)]
enum TokenAction {
    /// Store the bearer token issued at login.
    Set { token: String },
    /// Forget the stored token.
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration from environment (.env included)
    let config = Config::from_env()?;

    let file_appender = tracing_appender::rolling::daily("logs", "exam-client.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    // The terminal belongs to the exam; only warnings go to stderr.
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(LevelFilter::WARN);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    let store = TokenStore::new(config.token_file.clone());

    match cli.command {
        Command::Token { action } => {
            match action {
                TokenAction::Set { token } => {
                    store.save(&token)?;
                    println!("Token saved to {}", store.path().display());
                }
                TokenAction::Clear => {
                    store.clear()?;
                    println!("Logged out.");
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Result { test_id } => {
            let api = HttpAssessmentApi::new(&config)?;
            let context = SessionContext::new(store.load()?);
            let route = Route::Results {
                test_id: TestId::parse(&test_id)?,
                notice: None,
            };
            Ok(navigate(&api, &context, route).await)
        }
        Command::Take { test_id } => {
            let api = Arc::new(HttpAssessmentApi::new(&config)?);
            let context = SessionContext::new(store.load()?);
            let runner = SessionRunner::new(api.clone(), context.clone(), config.tick_interval);

            let route = take_test(runner, TestId::parse(&test_id)?).await?;
            Ok(navigate(api.as_ref(), &context, route).await)
        }
    }
}

/// Runs the interactive exam until the session reaches a terminal outcome.
async fn take_test(
    runner: SessionRunner<HttpAssessmentApi>,
    test_id: TestId,
) -> anyhow::Result<Route> {
    let (command_tx, command_rx) = mpsc::channel(16);
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();

    let session = tokio::spawn(async move { runner.run(&test_id, command_rx, update_tx).await });

    let mut lines = spawn_stdin_reader();
    let mut view = ExamView::default();
    let mut stdin_open = true;

    println!("Loading Exam...");
    loop {
        tokio::select! {
            update = update_rx.recv() => match update {
                Some(update) => view.apply(update),
                // The runner dropped its sender: the session is over.
                None => break,
            },
            line = lines.recv(), if stdin_open => match line {
                Some(line) => match parse_input(&line) {
                    Ok(Input::Session(command)) => {
                        let _ = command_tx.send(command).await;
                    }
                    Ok(Input::ShowTime) => println!("{}", render::clock_line(view.remaining_secs)),
                    Ok(Input::ShowAnswers) => {
                        println!("{}", render::render_answers(&view.answers, view.question_count()))
                    }
                    Ok(Input::Help) => println!("{}", HELP),
                    Ok(Input::Empty) => {}
                    Err(msg) => println!("{}", msg),
                },
                None => {
                    stdin_open = false;
                    let _ = command_tx.send(SessionCommand::Leave).await;
                }
            },
        }
    }

    let outcome = session.await.context("exam session task failed")?;
    Ok(route_for(outcome))
}

/// Blocking stdin lives on its own thread so it never holds up shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    rx
}

/// What the terminal currently shows of the exam.
#[derive(Default)]
struct ExamView {
    test: Option<Test>,
    answers: AnswerSet,
    remaining_secs: u64,
}

impl ExamView {
    fn question_count(&self) -> usize {
        self.test.as_ref().map_or(0, Test::question_count)
    }

    fn apply(&mut self, update: SessionUpdate) {
        match update {
            SessionUpdate::Started {
                test,
                remaining_secs,
            } => {
                self.remaining_secs = remaining_secs;
                print!("{}", render::render_test(&test, &self.answers, remaining_secs));
                println!("{}", HELP);
                self.test = Some(test);
            }
            SessionUpdate::ClockChanged { remaining_secs } => {
                self.remaining_secs = remaining_secs;
                if render::should_announce(remaining_secs) {
                    println!("{}", render::clock_line(remaining_secs));
                }
            }
            SessionUpdate::AnswerRecorded { index, key } => {
                self.answers.select(index, key);
                println!("Q{} -> {}", index + 1, key);
            }
            SessionUpdate::SelectionRejected(err) => println!("{}", err),
            SessionUpdate::Submitting { trigger, answers } => {
                self.answers = answers;
                match trigger {
                    SubmitTrigger::Expired => {
                        println!("Time is up! Submitting your answers...")
                    }
                    SubmitTrigger::Manual => {
                        println!("Submitting your answers...")
                    }
                }
            }
            SessionUpdate::SubmitFailed { reason } => {
                println!("Error submitting test: {}", reason);
                println!("Your answers are kept. Type `submit` to try again or `quit` to leave.");
            }
        }
    }
}

/// Carries out the navigation the session ended with.
async fn navigate<A: AssessmentApi + ?Sized>(
    api: &A,
    context: &SessionContext,
    route: Route,
) -> ExitCode {
    match route {
        Route::Login => {
            print_login_hint();
            ExitCode::FAILURE
        }
        Route::Error(msg) => {
            eprintln!("{}", msg);
            ExitCode::FAILURE
        }
        Route::Exit => {
            println!("You left the exam without submitting.");
            ExitCode::SUCCESS
        }
        Route::Results { test_id, notice } => {
            if let Some(notice) = notice {
                println!("{}", notice);
            }
            let Some(token) = context.token() else {
                print_login_hint();
                return ExitCode::FAILURE;
            };
            show_result(api, token, &test_id).await
        }
    }
}

async fn show_result<A: AssessmentApi + ?Sized>(
    api: &A,
    token: &SessionToken,
    test_id: &TestId,
) -> ExitCode {
    match api.fetch_result(token, test_id).await {
        Ok(result) => {
            print!("{}", render::render_result(&result));
            ExitCode::SUCCESS
        }
        Err(ApiError::Unauthorized) => {
            print_login_hint();
            ExitCode::FAILURE
        }
        Err(ApiError::Network(e)) => {
            tracing::error!("Failed to fetch result for {}: {:?}", test_id, e);
            eprintln!("Network error");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::warn!("Result for {} unavailable: {}", test_id, e);
            eprintln!("Result not found or not authorized.");
            ExitCode::FAILURE
        }
    }
}

fn print_login_hint() {
    eprintln!("You are not logged in. Log in on the platform, then run `exam-client token set <TOKEN>`.");
}
