use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Time an automated player gets per move unless its config says otherwise.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// One player config file.
///
/// ```json
/// { "nick": "minimax", "kind": "http", "url": "http://127.0.0.1:5000/api/make-move" }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PlayerConfig {
    pub nick: String,
    #[serde(flatten)]
    pub source: SourceConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    /// Moves are typed on stdin.
    Human,
    /// A bot executable speaking the stdio protocol. `cmd` holds the
    /// program followed by its arguments.
    Process {
        cmd: Vec<String>,
        #[serde(default = "default_timeout_ms")]
        timeout_ms: u64,
    },
    /// The suggestion service at `url`.
    Http {
        url: String,
        #[serde(default = "default_timeout_ms")]
        timeout_ms: u64,
    },
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl SourceConfig {
    /// The per-move time limit, `None` for humans.
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            SourceConfig::Human => None,
            SourceConfig::Process { timeout_ms, .. } | SourceConfig::Http { timeout_ms, .. } => {
                Some(Duration::from_millis(*timeout_ms))
            }
        }
    }
}

impl PlayerConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Could not open player config '{}'", path.display()))?;
        let config: PlayerConfig = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Could not parse player config '{}'", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if let SourceConfig::Process { cmd, .. } = &self.source {
            if cmd.is_empty() {
                anyhow::bail!("Player '{}' has an empty command", self.nick);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_kind() {
        let human: PlayerConfig =
            serde_json::from_str(r#"{"nick": "alice", "kind": "human"}"#).unwrap();
        assert_eq!(human.source, SourceConfig::Human);
        assert_eq!(human.source.timeout(), None);

        let bot: PlayerConfig = serde_json::from_str(
            r#"{"nick": "rnd", "kind": "process", "cmd": ["target/release/random_bot"]}"#,
        )
        .unwrap();
        assert_eq!(
            bot.source,
            SourceConfig::Process {
                cmd: vec![String::from("target/release/random_bot")],
                timeout_ms: DEFAULT_TIMEOUT_MS,
            }
        );

        let service: PlayerConfig = serde_json::from_str(
            r#"{"nick": "mm", "kind": "http", "url": "http://localhost:5000/api/make-move", "timeout_ms": 250}"#,
        )
        .unwrap();
        assert_eq!(service.nick, "mm");
        assert_eq!(service.source.timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let config = r#"{"nick": "x", "kind": "telepathy"}"#;
        assert!(serde_json::from_str::<PlayerConfig>(config).is_err());
    }

    #[test]
    fn empty_command_is_rejected() {
        let config = PlayerConfig {
            nick: String::from("nobody"),
            source: SourceConfig::Process {
                cmd: vec![],
                timeout_ms: 10,
            },
        };
        assert!(config.validate().is_err());
    }
}
