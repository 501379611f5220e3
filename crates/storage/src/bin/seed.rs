use std::fmt;

use quiz_core::model::{Difficulty, Question, QuestionId, Topic, TopicId};
use storage::repository::Storage;

const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3?mode=rwc";

/// Question ids for a seeded topic are `topic_id * 100 + level`.
const QUESTION_ID_STRIDE: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    db_url: String,
    topic_id: TopicId,
    question_base: u64,
    stage: String,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Seed(Args),
    Help,
}

#[derive(Debug, PartialEq, Eq)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidTopicId { source: &'static str, raw: String },
    TopicIdTooLarge { topic_id: TopicId },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidTopicId { source, raw } => write!(f, "invalid {source} value: {raw}"),
            ArgsError::TopicIdTooLarge { topic_id } => {
                write!(f, "topic id {topic_id} is too large to derive question ids from")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

fn parse_topic_id(raw: String, source: &'static str) -> Result<TopicId, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidTopicId { source, raw })
}

/// First question id for the topic; every seeded level must fit above it.
fn question_base(topic_id: TopicId) -> Result<u64, ArgsError> {
    topic_id
        .value()
        .checked_mul(QUESTION_ID_STRIDE)
        .filter(|base| base.checked_add(u64::from(Difficulty::HARDEST.level())).is_some())
        .ok_or(ArgsError::TopicIdTooLarge { topic_id })
}

/// `topics.slug` is unique, so each seeded topic gets its own.
fn topic_slug(topic_id: TopicId) -> String {
    format!("times-tables-{topic_id}")
}

impl Args {
    /// Flags win over environment variables, which win over defaults.
    fn parse(
        args: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Command, ArgsError> {
        let mut db_url = env("QUIZ_DB_URL").unwrap_or_else(|| DEFAULT_DB_URL.to_owned());
        let mut topic_id = env("QUIZ_SEED_TOPIC_ID")
            .map(|raw| parse_topic_id(raw, "QUIZ_SEED_TOPIC_ID"))
            .transpose()?
            .unwrap_or_else(|| TopicId::new(1));
        let mut stage = env("QUIZ_SEED_STAGE").unwrap_or_else(|| "KS2".into());

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--topic-id" => {
                    let value = require_value(&mut args, "--topic-id")?;
                    topic_id = parse_topic_id(value, "--topic-id")?;
                }
                "--stage" => {
                    stage = require_value(&mut args, "--stage")?;
                }
                "--help" | "-h" => return Ok(Command::Help),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Command::Seed(Self {
            db_url,
            topic_id,
            question_base: question_base(topic_id)?,
            stage,
        }))
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: {DEFAULT_DB_URL})");
    eprintln!("  --topic-id <id>           Topic id to upsert, slug times-tables-<id> (default: 1)");
    eprintln!("  --stage <stage>           Stage label for the topic (default: KS2)");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  QUIZ_DB_URL, QUIZ_SEED_TOPIC_ID, QUIZ_SEED_STAGE");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let command = Args::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
        .inspect_err(|e| {
            eprintln!("{e}");
            print_usage();
        })?;
    let args = match command {
        Command::Seed(args) => args,
        Command::Help => {
            print_usage();
            return Ok(());
        }
    };

    let storage = Storage::sqlite(&args.db_url).await?;

    let topic = Topic::new(
        args.topic_id,
        "Maths",
        "Times tables",
        topic_slug(args.topic_id),
        args.stage.clone(),
    )?;
    storage.topics.upsert_topic(&topic).await?;

    // One question per difficulty band, so every mastery level has a match.
    let samples = [
        (1, "2 x 3", "6", ["5", "8", "9"], None),
        (2, "4 x 6", "24", ["20", "26", "28"], Some("4 x 6 is four lots of six.")),
        (3, "7 x 8", "56", ["54", "63", "48"], Some("7 x 8 = 56: five, six, seven, eight.")),
        (4, "9 x 12", "108", ["98", "118", "112"], Some("9 x 12 is 10 x 12 minus 12.")),
        (5, "12 x 12", "144", ["124", "132", "154"], Some("12 x 12 is a gross.")),
    ];
    for (level, content, answer, distractors, explanation) in samples {
        let question = Question::new(
            QuestionId::new(args.question_base + u64::from(level)),
            topic.id(),
            format!("What is {content}?"),
            answer,
            distractors.map(str::to_owned).to_vec(),
            Difficulty::new(level)?,
            explanation.map(str::to_owned),
        )?;
        storage.questions.upsert_question(&question).await?;
    }

    println!(
        "Seeded topic {} ({}) with {} questions into {}",
        topic.id(),
        topic.slug(),
        samples.len(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Command, ArgsError> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Args::parse(args.iter().map(|a| (*a).to_owned()), |key| env.get(key).cloned())
    }

    fn seed(args: &[&str], env: &[(&str, &str)]) -> Args {
        match parse(args, env).unwrap() {
            Command::Seed(args) => args,
            Command::Help => panic!("expected seed"),
        }
    }

    #[test]
    fn defaults_seed_topic_one() {
        let args = seed(&[], &[]);
        assert_eq!(args.db_url, DEFAULT_DB_URL);
        assert_eq!(args.topic_id, TopicId::new(1));
        assert_eq!(args.question_base, 100);
        assert_eq!(args.stage, "KS2");
    }

    #[test]
    fn each_topic_gets_its_own_slug() {
        assert_eq!(topic_slug(TopicId::new(1)), "times-tables-1");
        assert_eq!(topic_slug(TopicId::new(7)), "times-tables-7");
        let slug = topic_slug(TopicId::new(7));
        assert!(Topic::new(TopicId::new(7), "Maths", "Times tables", slug, "KS2").is_ok());
    }

    #[test]
    fn flag_overrides_env_topic() {
        let args = seed(&["--topic-id", "3"], &[("QUIZ_SEED_TOPIC_ID", "9")]);
        assert_eq!(args.topic_id, TopicId::new(3));
        assert_eq!(args.question_base, 300);

        let args = seed(&[], &[("QUIZ_SEED_TOPIC_ID", "9")]);
        assert_eq!(args.topic_id, TopicId::new(9));
    }

    #[test]
    fn invalid_env_topic_is_reported() {
        assert_eq!(
            parse(&[], &[("QUIZ_SEED_TOPIC_ID", "nine")]).unwrap_err(),
            ArgsError::InvalidTopicId {
                source: "QUIZ_SEED_TOPIC_ID",
                raw: "nine".into()
            }
        );
        assert_eq!(
            parse(&["--topic-id", "-1"], &[]).unwrap_err(),
            ArgsError::InvalidTopicId {
                source: "--topic-id",
                raw: "-1".into()
            }
        );
    }

    #[test]
    fn huge_topic_id_is_rejected() {
        let raw = u64::MAX.to_string();
        assert_eq!(
            parse(&["--topic-id", &raw], &[]).unwrap_err(),
            ArgsError::TopicIdTooLarge {
                topic_id: TopicId::new(u64::MAX)
            }
        );

        // The largest id whose hardest question id still fits.
        let max = (u64::MAX - u64::from(Difficulty::HARDEST.level())) / QUESTION_ID_STRIDE;
        assert_eq!(question_base(TopicId::new(max)).unwrap(), max * QUESTION_ID_STRIDE);
        assert!(question_base(TopicId::new(max + 1)).is_err());
    }

    #[test]
    fn bad_flags_are_reported() {
        assert_eq!(
            parse(&["--stage"], &[]).unwrap_err(),
            ArgsError::MissingValue { flag: "--stage" }
        );
        assert!(matches!(
            parse(&["--db", " "], &[]).unwrap_err(),
            ArgsError::InvalidDbUrl { .. }
        ));
        assert_eq!(parse(&["-h", "--bogus"], &[]).unwrap(), Command::Help);
    }
}
