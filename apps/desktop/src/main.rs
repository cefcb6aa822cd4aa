use std::{fmt, fs, path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::DEFAULT_LOG_FILTER, load_settings, parse_route, strings, FieldControl,
    HttpSurveyApi, ResponseSession, Route, SaveDispatch, SaveKind, SessionController,
    SessionPhase,
};
use tracing_subscriber::EnvFilter;

mod answers_file;

#[derive(Parser, Debug)]
#[command(name = "survey_cli", about = "Inspect and answer a survey from an emailed link")]
struct Args {
    /// Overrides the configured API base URL.
    #[arg(long, global = true)]
    api_base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the survey form with any previously saved answers.
    Show { link: String },
    /// Apply answers from a JSON file and save them as a draft or submit them.
    Answer {
        link: String,
        /// JSON object keyed by question id or question code.
        #[arg(long)]
        answers: PathBuf,
        #[arg(long)]
        submit: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings().with_api_base_url(args.api_base_url);
    let filter = EnvFilter::try_new(&settings.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let api = Arc::new(HttpSurveyApi::from_settings(&settings)?);
    match args.command {
        Command::Show { link } => {
            let controller = open(api, &link).await?;
            let mut out = String::new();
            controller
                .snapshot(|session| describe(&mut out, session))
                .await?;
            print!("{out}");
        }
        Command::Answer {
            link,
            answers,
            submit,
        } => {
            let raw = fs::read_to_string(&answers)
                .with_context(|| format!("failed to read {}", answers.display()))?;
            let answers = answers_file::parse(&raw)?;
            let controller = open(api, &link).await?;
            if controller.snapshot(ResponseSession::is_completed).await {
                println!("{}", strings::THANK_YOU_TITLE);
                return Ok(());
            }

            let questions = controller
                .snapshot(|session| session.questions().to_vec())
                .await;
            let mut rejected = Vec::new();
            for (question, value) in answers_file::resolve(&questions, &answers)? {
                let current = controller
                    .snapshot(|session| session.answer(&question.id).cloned())
                    .await;
                for edit in answers_file::edits_for(question, current.as_ref(), value)? {
                    if !controller.edit(&question.id, edit.clone()).await {
                        rejected.push((question.id.clone(), edit));
                    }
                }
            }
            answers_file::check_rejected(submit, &rejected)?;

            let kind = if submit { SaveKind::Submit } else { SaveKind::Draft };
            match controller.save(kind).await? {
                SaveDispatch::Sent(saved) => {
                    println!("response {} saved ({:?})", saved.response_id, saved.status);
                }
                SaveDispatch::Skipped => bail!("save was not sent"),
            }
            if controller.snapshot(ResponseSession::is_completed).await {
                println!("{}", strings::THANK_YOU_TITLE);
            } else {
                println!("{}", strings::DRAFT_SAVED);
            }
        }
    }

    Ok(())
}

async fn open(api: Arc<HttpSurveyApi>, link: &str) -> Result<SessionController> {
    let route = parse_route(link);
    match &route {
        Route::Survey(_) => {}
        Route::InvalidLink => bail!("{}", strings::INVALID_LINK),
        Route::NotFound => bail!("{}", strings::ROUTE_NOT_FOUND),
    }
    let controller = SessionController::from_route(api, &route);
    controller
        .load()
        .await
        .with_context(|| strings::LOAD_FAILED_TITLE.to_string())?;
    Ok(controller)
}

fn describe(out: &mut impl fmt::Write, session: &ResponseSession) -> fmt::Result {
    if let Some(loaded) = session.survey() {
        writeln!(out, "{} ({})", loaded.survey.name, loaded.survey.code)?;
        if let Some(description) = &loaded.survey.description {
            writeln!(out, "{description}")?;
        }
    }
    if session.phase() == SessionPhase::Completed {
        writeln!(out, "{}", strings::THANK_YOU_TITLE)?;
    }

    let Some(form) = session.form() else {
        return Ok(());
    };
    for group in &form.groups {
        writeln!(out, "\n[{}]", group.group_code)?;
        for field in &group.fields {
            let marker = if field.required { "*" } else { " " };
            writeln!(
                out,
                "{marker} {} ({}, {}): {}",
                field.label(),
                field.question_id(),
                field.question.question_code,
                control_summary(&field.control)
            )?;
        }
    }
    Ok(())
}

fn control_summary(control: &FieldControl) -> String {
    let checkbox = |selected: bool, label: &str| {
        format!("[{}] {label}", if selected { "x" } else { " " })
    };
    match control {
        FieldControl::Text { value, .. } | FieldControl::Number { value, .. } => value.clone(),
        FieldControl::SingleChoice { options } | FieldControl::MultipleChoice { options } => {
            options
                .iter()
                .map(|option| checkbox(option.selected, &option.label))
                .collect::<Vec<_>>()
                .join("  ")
        }
        FieldControl::Rating { choices } => choices
            .iter()
            .map(|choice| checkbox(choice.selected, &choice.value.to_string()))
            .collect::<Vec<_>>()
            .join(" "),
    }
}
