//! algoviz binary
//!
//! Usage:
//!   algoviz list
//!   algoviz run <algorithm> [--bars N] [--speed 2x] [--steps]
//!   algoviz quiz <topic> [--answers CABD..]
//!   algoviz tour <category> [--answers ..] [--show-progress]

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use algoviz_cli::{logging, Answerer, ConsoleObserver, LearningSession, Lesson, SessionConfig};
use algoviz_player::PlaybackSpeed;
use algoviz_quiz::{
    format_elapsed, AnswerFeedback, AnswerOption, IdentityProvider, InMemoryIdentity,
    InMemoryProgress, QuestionBanks, QuizQuestion, QuizResult, UserId,
};
use algoviz_steps::{
    Algorithm, Category, DEFAULT_BAR_COUNT, DEFAULT_DELETE_VALUE, DEFAULT_INSERT_VALUE,
};
use clap::{Args, Parser, Subcommand};

const GUEST_EMAIL: &str = "guest@algoviz.local";

#[derive(Parser)]
#[command(
    name = "algoviz",
    version,
    about = "Step through sorting, tree, graph and ML algorithms, then quiz yourself"
)]
struct Cli {
    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List algorithms by category.
    List,

    /// Visualize one algorithm.
    Run {
        /// Algorithm key, e.g. BubbleSort or BFS.
        algorithm: Algorithm,

        #[command(flatten)]
        playback: PlaybackArgs,
    },

    /// Take the quiz for one algorithm.
    Quiz {
        /// Algorithm key, e.g. QuickSort.
        topic: Algorithm,

        #[command(flatten)]
        quiz: QuizArgs,
    },

    /// Run and quiz every algorithm of a category in order.
    Tour {
        /// sorting, tree, graph or ml.
        category: Category,

        #[command(flatten)]
        playback: PlaybackArgs,

        #[command(flatten)]
        quiz: QuizArgs,
    },
}

#[derive(Args)]
struct PlaybackArgs {
    /// Bars in the sorting demos.
    #[arg(long, default_value_t = DEFAULT_BAR_COUNT)]
    bars: usize,

    /// Step delay at 1x, in milliseconds.
    #[arg(long = "delay-ms", default_value_t = 500)]
    delay_ms: u64,

    /// Playback speed: 0.25, 0.5, 1, 2, 4, 10 or max.
    #[arg(long, default_value = "1x")]
    speed: PlaybackSpeed,

    /// Seed for random bars and sampled ML data.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Graph start node.
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// A* goal node (default: last node).
    #[arg(long)]
    goal: Option<usize>,

    /// Value for the tree insert demo.
    #[arg(long = "insert", default_value_t = DEFAULT_INSERT_VALUE)]
    insert_value: i64,

    /// Value for the tree delete demo.
    #[arg(long = "delete", default_value_t = DEFAULT_DELETE_VALUE)]
    delete_value: i64,

    /// Print every step, not just narration.
    #[arg(long)]
    steps: bool,
}

impl PlaybackArgs {
    fn config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_bar_count(self.bars)
            .with_base_delay(Duration::from_millis(self.delay_ms))
            .with_speed(self.speed)
            .with_seed(self.seed)
            .with_start(self.start)
            .with_goal(self.goal)
            .with_insert_value(self.insert_value)
            .with_delete_value(self.delete_value)
    }
}

#[derive(Args)]
struct QuizArgs {
    /// Answers to submit in order, e.g. "CBADAB". Reads stdin when absent.
    #[arg(long)]
    answers: Option<String>,

    /// Print recorded progress as JSON at the end.
    #[arg(long)]
    show_progress: bool,
}

/// Prints each question and takes answers from a script or stdin.
struct TerminalAnswerer {
    script: Option<VecDeque<Option<AnswerOption>>>,
}

impl TerminalAnswerer {
    fn new(answers: Option<&str>) -> Self {
        let script = answers.map(|answers| {
            answers
                .chars()
                .filter(|c| !c.is_whitespace() && *c != ',')
                .map(|c| c.to_string().parse().ok())
                .collect()
        });
        Self { script }
    }

    fn read_stdin() -> Option<AnswerOption> {
        print!("Your answer: ");
        io::stdout().flush().ok()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).ok()?;
        line.parse().ok()
    }
}

impl Answerer for TerminalAnswerer {
    fn answer(&mut self, question: &QuizQuestion) -> Option<AnswerOption> {
        println!();
        println!("Q: {}", question.prompt);
        for (option, text) in question.labelled_options() {
            println!("  {option}) {text}");
        }
        match self.script.as_mut() {
            Some(script) => {
                let answer = script.pop_front().flatten();
                if let Some(answer) = answer {
                    println!("Your answer: {answer}");
                }
                answer
            }
            None => Self::read_stdin(),
        }
    }

    fn reveal(&mut self, feedback: &AnswerFeedback) {
        if feedback.is_correct {
            println!("Correct!");
        } else {
            println!("Wrong! The answer was {}", feedback.correct_answer);
        }
    }
}

fn print_result(result: &QuizResult) {
    println!(
        "{}: {}/{} correct ({:.0}%) in {}",
        result.topic,
        result.correct,
        result.total,
        result.score,
        format_elapsed(result.elapsed)
    );
}

fn print_lessons(lessons: &[Lesson]) {
    println!();
    for lesson in lessons {
        match &lesson.result {
            Some(result) => print_result(result),
            None => println!(
                "{}: run cancelled after {} steps",
                lesson.algorithm,
                lesson.outcome.delivered()
            ),
        }
    }
}

/// Sign in the in-memory guest account and point progress at it.
fn guest_progress() -> Result<(UserId, InMemoryProgress), Box<dyn std::error::Error>> {
    let mut identity = InMemoryIdentity::new();
    identity.register_verified("Guest", GUEST_EMAIL, "guest")?;
    let user = identity.sign_in(GUEST_EMAIL, "guest")?;
    let mut progress = InMemoryProgress::new();
    progress.sign_in(user.clone());
    Ok((user, progress))
}

/// Ctrl-C cancels a running visualization, or exits when nothing is running.
fn cancel_on_ctrl_c(session: &LearningSession<ConsoleObserver<io::Stdout>, InMemoryProgress>) {
    let handle = session.handle();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if !handle.cancel() {
                std::process::exit(130);
            }
        }
    });
}

fn list() {
    for category in Category::ALL {
        println!("{category}:");
        for algorithm in category.sequence() {
            println!("  {algorithm}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    let command = match cli.command {
        Command::List => {
            list();
            return Ok(());
        }
        command => command,
    };

    let (user, progress) = guest_progress()?;
    let banks = QuestionBanks::builtin()?;
    let mut observer = ConsoleObserver::stdout();

    let (config, quiz_args) = match &command {
        Command::Run { playback, .. } => (playback.config(), None),
        Command::Quiz { quiz, .. } => (SessionConfig::default(), Some(quiz)),
        Command::Tour { playback, quiz, .. } => (playback.config(), Some(quiz)),
        Command::List => (SessionConfig::default(), None),
    };
    if let Command::Run { playback, .. } | Command::Tour { playback, .. } = &command {
        observer.set_show_steps(playback.steps);
    }
    let mut answerer = TerminalAnswerer::new(quiz_args.and_then(|q| q.answers.as_deref()));
    let show_progress = quiz_args.is_some_and(|q| q.show_progress);

    let mut session = LearningSession::new(config, observer, banks, progress);
    cancel_on_ctrl_c(&session);

    match command {
        Command::Run { algorithm, .. } => {
            session.select(algorithm);
            let outcome = session.run_current().await?;
            if !outcome.is_completed() {
                println!("Cancelled after {} steps", outcome.delivered());
            }
        }
        Command::Quiz { topic, .. } => {
            session.select(topic);
            let result = session.take_quiz(&mut answerer)?;
            println!();
            print_result(&result);
        }
        Command::Tour { category, .. } => {
            let lessons = session.tour(category, &mut answerer).await?;
            print_lessons(&lessons);
        }
        Command::List => {}
    }

    let (mut observer, progress) = session.into_parts();
    if let Some(e) = observer.take_error() {
        return Err(e.into());
    }
    if show_progress {
        println!("{}", progress.to_json(&user)?);
    }
    Ok(())
}
