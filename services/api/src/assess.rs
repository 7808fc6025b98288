use crate::cli::{AssessArgs, ContactArgs, ResultsArgs};
use brightmind::assessment::{
    interpret, AssessmentResult, AssessmentWizard, FileResultsStore, QuestionBank, ResultsStore,
    TransitionScope, WizardError,
};
use brightmind::config::AppConfig;
use brightmind::contact::{ContactClient, ContactForm, ContactOutcome, HttpContactTransport};
use brightmind::error::AppError;
use brightmind::intake::{Attachment, ContactRequest};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::oneshot;

/// Where answers come from: a `--answers` list or stdin, one per line.
pub(crate) enum AnswerSource {
    Scripted(VecDeque<String>),
    Interactive(Lines<BufReader<Stdin>>),
}

impl AnswerSource {
    fn from_args(answers: Option<Vec<String>>) -> Self {
        match answers {
            Some(values) => Self::Scripted(values.into()),
            None => Self::Interactive(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    async fn next_answer(&mut self) -> Result<Option<String>, AppError> {
        match self {
            Self::Scripted(queue) => Ok(queue.pop_front()),
            Self::Interactive(lines) => Ok(lines.next_line().await?),
        }
    }
}

pub(crate) async fn run_assessment(args: AssessArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(dir) = args.results_dir {
        config.assessment.results_dir = dir;
    }

    let store = Arc::new(FileResultsStore::new(&config.assessment.results_dir));
    let mut wizard = AssessmentWizard::new(QuestionBank::standard(), store);
    let mut source = AnswerSource::from_args(args.answers);
    let mut stdout = std::io::stdout();

    writeln!(stdout, "Welcome to your mental health assessment.")?;
    writeln!(
        stdout,
        "Over the last two weeks, how often have you been bothered by the following?"
    )?;
    let Some(result) = walk(&mut wizard, &mut source, &mut stdout).await? else {
        return Ok(());
    };

    writeln!(stdout, "Analyzing your responses... redirecting to your results.")?;
    stdout.flush()?;
    redirect_after(config.assessment.redirect_delay).await;
    render_results(&mut stdout, wizard.bank(), &result)
}

/// Drive the wizard until it is submitted or the answers run out.
pub(crate) async fn walk<S, W>(
    wizard: &mut AssessmentWizard<S>,
    source: &mut AnswerSource,
    out: &mut W,
) -> Result<Option<AssessmentResult>, AppError>
where
    S: ResultsStore,
    W: Write,
{
    wizard.start();

    while let Some(index) = wizard.current_index() {
        if let Some(question) = wizard.current_question() {
            writeln!(
                out,
                "\nQuestion {} of {} ({:.0}% complete)",
                index + 1,
                wizard.bank().len(),
                wizard.progress_percent()
            )?;
            writeln!(out, "{}", question.text)?;
            for option in wizard.bank().answer_options() {
                writeln!(out, "  {}) {}", option.value, option.label)?;
            }
        }
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = source.next_answer().await? else {
            writeln!(out, "\nAssessment ended before submission; nothing was saved.")?;
            return Ok(None);
        };
        let Ok(raw) = line.trim().parse::<u8>() else {
            writeln!(out, "Please choose one of 0, 1, 2 or 3.")?;
            continue;
        };
        match wizard.answer(raw) {
            Ok(_) => {}
            Err(WizardError::InvalidAnswer(err)) => {
                writeln!(out, "{err}")?;
                continue;
            }
            Err(err) => return Err(err.into()),
        }

        if !(wizard.is_last_question() && wizard.selected().is_some()) {
            continue;
        }
        match wizard.submit() {
            Ok(result) => {
                writeln!(out, "\nAssessment Complete!")?;
                return Ok(Some(result));
            }
            Err(WizardError::IncompleteAssessment { .. }) => writeln!(
                out,
                "Incomplete Assessment: please answer all questions before submitting."
            )?,
            Err(err) => return Err(err.into()),
        }
    }

    Ok(None)
}

/// Wait out the completion notice; the scheduled callback dies with the scope.
pub(crate) async fn redirect_after(delay: Duration) {
    let mut scope = TransitionScope::new();
    let (arrived, arrival) = oneshot::channel();
    scope.schedule(delay, move || {
        let _ = arrived.send(());
    });
    let _ = arrival.await;
}

pub(crate) fn render_results<W: Write>(
    out: &mut W,
    bank: &QuestionBank,
    result: &AssessmentResult,
) -> Result<(), AppError> {
    writeln!(
        out,
        "\nYour assessment results ({})",
        result.completed_at.format("%Y-%m-%d %H:%M UTC")
    )?;
    for reading in interpret(bank, &result.scores()) {
        writeln!(
            out,
            "  {:<10} {:>2}/{:<2}  ({})",
            reading.category.label(),
            reading.score,
            reading.max,
            reading.band.label()
        )?;
    }
    writeln!(
        out,
        "  Answered {} of {} questions",
        result.answers.answered_count(),
        result.total_questions
    )?;
    writeln!(
        out,
        "This screening is not a diagnosis. Use `brightmind-api contact` to reach a professional."
    )?;
    Ok(())
}

pub(crate) fn show_results(args: ResultsArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(dir) = args.results_dir {
        config.assessment.results_dir = dir;
    }

    let store = FileResultsStore::new(&config.assessment.results_dir);
    let mut stdout = std::io::stdout();
    match store.load()? {
        Some(result) => render_results(&mut stdout, &QuestionBank::standard(), &result),
        None => {
            writeln!(
                stdout,
                "No assessment results found in {}. Run `brightmind-api assess` first.",
                config.assessment.results_dir.display()
            )?;
            Ok(())
        }
    }
}

pub(crate) async fn send_contact(args: ContactArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(url) = args.api_url {
        config.contact.endpoint = url;
    }

    let attachment = args
        .attachment
        .as_deref()
        .map(Attachment::from_path)
        .transpose()?;
    let mut form = ContactForm::new(
        ContactRequest {
            name: args.name,
            company: args.company,
            email: args.email,
            phone: args.phone,
            urgency: args.urgency,
            message: args.message,
        },
        attachment,
    );

    let client = ContactClient::new(HttpContactTransport::new(&config.contact)?);
    match form.submit(&client).await? {
        ContactOutcome::Delivered { message, .. } => println!("{message}"),
        ContactOutcome::Rejected { message } => println!("Error: {message}"),
    }
    Ok(())
}
