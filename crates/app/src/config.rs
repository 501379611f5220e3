use std::fmt;
use std::net::SocketAddr;

use quiz_core::policy::MasteryPolicy;

pub const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[derive(Debug, PartialEq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidBind { raw: String },
    InvalidPolicy { raw: String, reason: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidBind { raw } => write!(f, "invalid --bind value: {raw}"),
            ArgsError::InvalidPolicy { raw, reason } => {
                write!(f, "invalid --mastery-policy value {raw}: {reason}")
            }
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

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] [--bind <addr>] [--mastery-policy <policy>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --bind {DEFAULT_BIND}");
    eprintln!("  --mastery-policy snap     (or ema:<alpha>, 0 < alpha <= 1)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_BIND, QUIZ_MASTERY_POLICY, RUST_LOG");
}

/// What the binary was asked to do.
#[derive(Debug, PartialEq)]
pub enum Command {
    Serve(Args),
    Help,
}

#[derive(Debug, PartialEq)]
pub struct Args {
    pub db_url: String,
    pub bind: SocketAddr,
    pub policy: MasteryPolicy,
}

fn parse_bind(raw: String) -> Result<SocketAddr, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidBind { raw })
}

fn parse_policy(raw: String) -> Result<MasteryPolicy, ArgsError> {
    raw.parse().map_err(|err: quiz_core::policy::PolicyError| {
        ArgsError::InvalidPolicy {
            raw,
            reason: err.to_string(),
        }
    })
}

fn parse_db_url(raw: String) -> Result<String, ArgsError> {
    if raw.trim().is_empty() {
        return Err(ArgsError::InvalidDbUrl { raw });
    }
    Ok(normalize_sqlite_url(raw))
}

impl Args {
    /// Flags win over environment variables, which win over defaults.
    ///
    /// `env` is injected so parsing stays independent of the process environment.
    pub fn parse(
        args: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Command, ArgsError> {
        let mut db_url = env("QUIZ_DB_URL")
            .map(parse_db_url)
            .transpose()?
            .unwrap_or_else(|| DEFAULT_DB_URL.to_owned());
        let mut bind = parse_bind(env("QUIZ_BIND").unwrap_or_else(|| DEFAULT_BIND.to_owned()))?;
        let mut policy = env("QUIZ_MASTERY_POLICY")
            .map(parse_policy)
            .transpose()?
            .unwrap_or_default();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => db_url = parse_db_url(require_value(&mut args, "--db")?)?,
                "--bind" => bind = parse_bind(require_value(&mut args, "--bind")?)?,
                "--mastery-policy" => {
                    policy = parse_policy(require_value(&mut args, "--mastery-policy")?)?;
                }
                "--help" | "-h" => return Ok(Command::Help),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Command::Serve(Self {
            db_url,
            bind,
            policy,
        }))
    }
}

/// Turns a bare path or `sqlite:` path into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Creates the database file and its parent directories if they do not exist yet.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
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

    fn serve(args: &[&str], env: &[(&str, &str)]) -> Args {
        match parse(args, env).unwrap() {
            Command::Serve(args) => args,
            Command::Help => panic!("expected serve"),
        }
    }

    #[test]
    fn defaults_apply_without_flags_or_env() {
        let args = serve(&[], &[]);
        assert_eq!(args.db_url, DEFAULT_DB_URL);
        assert_eq!(args.bind, DEFAULT_BIND.parse().unwrap());
        assert_eq!(args.policy, MasteryPolicy::SnapToOutcome);
    }

    #[test]
    fn flags_override_env() {
        let args = serve(
            &["--bind", "0.0.0.0:9000", "--mastery-policy", "ema:0.3"],
            &[("QUIZ_BIND", "127.0.0.1:1"), ("QUIZ_MASTERY_POLICY", "snap")],
        );
        assert_eq!(args.bind, "0.0.0.0:9000".parse().unwrap());
        assert_eq!(args.policy, MasteryPolicy::MovingAverage { alpha: 0.3 });
    }

    #[test]
    fn env_db_url_is_normalized() {
        let args = serve(&[], &[("QUIZ_DB_URL", "/tmp/quiz/dev.sqlite3")]);
        assert_eq!(args.db_url, "sqlite:///tmp/quiz/dev.sqlite3");
    }

    #[test]
    fn bad_values_are_reported() {
        assert_eq!(
            parse(&["--db"], &[]).unwrap_err(),
            ArgsError::MissingValue { flag: "--db" }
        );
        assert!(matches!(
            parse(&["--bind", "nowhere"], &[]).unwrap_err(),
            ArgsError::InvalidBind { .. }
        ));
        assert!(matches!(
            parse(&["--mastery-policy", "ema:7"], &[]).unwrap_err(),
            ArgsError::InvalidPolicy { .. }
        ));
        assert_eq!(
            parse(&["--port", "1"], &[]).unwrap_err(),
            ArgsError::UnknownArg("--port".into())
        );
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(parse(&["--help", "--bogus"], &[]).unwrap(), Command::Help);
    }

    #[test]
    fn sqlite_urls_pass_through() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite://already.db".into()),
            "sqlite://already.db"
        );
        assert_eq!(normalize_sqlite_url("sqlite:/abs/x.db".into()), "sqlite:///abs/x.db");
    }
}
