use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use exam_core::Clock;
use exam_core::model::Topic;
use exam_core::scoring::AnswerSheet;
use services::generator::ModelError;
use services::{AnalysisService, AppServices, QuestionModel};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    store: PathBuf,
    subject: Topic,
    charts_dir: PathBuf,
    demo_student: Option<String>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSubject { raw: String },
    InvalidStore { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSubject { raw } => write!(f, "invalid --subject value: {raw}"),
            ArgsError::InvalidStore { raw } => write!(f, "invalid --store value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut store = std::env::var("EXAM_STORE")
            .unwrap_or_else(|_| "all_tests_results.xlsx".into());
        let mut charts_dir = std::env::var("EXAM_CHARTS_DIR").unwrap_or_else(|_| "static".into());
        let mut subject = Topic::Arithmetic;
        let mut demo_student = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--store" => {
                    let value = require_value(&mut args, "--store")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidStore { raw: value });
                    }
                    store = value;
                }
                "--subject" => {
                    let value = require_value(&mut args, "--subject")?;
                    subject = value
                        .parse::<Topic>()
                        .map_err(|_| ArgsError::InvalidSubject { raw: value })?;
                }
                "--charts-dir" => {
                    charts_dir = require_value(&mut args, "--charts-dir")?;
                }
                "--demo" => {
                    demo_student = Some(require_value(&mut args, "--demo")?);
                }
                other => return Err(ArgsError::UnknownArg(other.to_string())),
            }
        }

        Ok(Self {
            store: PathBuf::from(store),
            subject,
            charts_dir: PathBuf::from(charts_dir),
            demo_student,
        })
    }
}

/// Offline stand-in for the question model so the demo flow runs without an
/// API key. Answers are predictable, which lets the demo submit a mix of
/// right and wrong ones.
struct DemoModel;

impl DemoModel {
    fn answer(topic: Topic, ordinal: u32) -> String {
        format!("{topic}-{ordinal}")
    }
}

#[async_trait]
impl QuestionModel for DemoModel {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, ModelError> {
        let topic = Topic::ALL
            .into_iter()
            .find(|t| user.contains(t.as_str()))
            .unwrap_or(Topic::Arithmetic);
        let reply = (1..=5)
            .map(|i| {
                format!(
                    "Question {i}: Practice {topic} item {i}?\nAnswer: {}\n",
                    Self::answer(topic, i)
                )
            })
            .collect::<String>();
        Ok(reply)
    }
}

/// Run one scripted session through generate → answer → score → finalize.
async fn run_demo_session(args: &Args, student: &str) -> Result<(), Box<dyn std::error::Error>> {
    let storage = Storage::open(&args.store)?;
    let services = AppServices::new(
        Arc::new(DemoModel),
        storage,
        Clock::default_clock(),
        &args.charts_dir,
    );
    let exam = services.exam();

    let id = services.registry().login(student).await?;
    for (index, topic) in Topic::ALL.into_iter().enumerate() {
        let questions = exam.generate_questions(id, topic).await?;
        println!("{topic}: {} questions generated", questions.len());

        // Answer a different share of each topic correctly.
        let correct = 5 - index as u32;
        let sheet: AnswerSheet = (1..=5u32)
            .map(|ordinal| {
                let answer = if ordinal <= correct {
                    DemoModel::answer(topic, ordinal)
                } else {
                    "pass".to_string()
                };
                (ordinal, answer)
            })
            .collect();
        let result = exam.submit_answers(id, topic, &sheet).await?;
        println!("{topic}: scored {}/{}", result.score, result.total);
    }

    let row = exam.finalize(id, "scripted demo run, smooth experience").await?;
    println!("appended row for {}", row.name);
    services.registry().logout(id).await;
    Ok(())
}

fn print_report(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let analysis = AnalysisService::with_vader(&args.charts_dir);
    let rows = analysis.load_dataset(&args.store)?;
    let report = analysis.subject_report(&rows, args.subject)?;

    println!(
        "{} ranking ({} of {} students rankable):",
        args.subject.label(),
        report.standings.len(),
        rows.len()
    );
    for (place, standing) in report.standings.iter().enumerate() {
        println!(
            "  {}. {} — {:.1}% ({}) chart: {}",
            place + 1,
            standing.name,
            standing.percentage,
            standing.marks,
            standing.chart.display()
        );
    }
    println!(
        "feedback sentiment: {} positive, {} negative",
        report.sentiment.positive, report.sentiment.negative
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse()?;

    if let Some(student) = args.demo_student.clone() {
        run_demo_session(&args, &student).await?;
    }

    print_report(&args)
}
