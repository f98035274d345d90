use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use connect4::{
    BotRequest, Okay, PlayerId, PlayerKind, SuggestionRequest, SuggestionResponse, COLS,
};
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use crate::config::{PlayerConfig, SourceConfig};
use crate::error::SourceError;

/// Something that picks columns for one seat.
#[async_trait::async_trait]
pub trait MoveSource: Send {
    fn name(&self) -> &str;

    fn kind(&self) -> PlayerKind;

    /// How long one call to [`Self::choose_column()`] may take.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Called before every round with the seat this source plays.
    async fn new_round(&mut self, _player: PlayerId) -> Result<(), SourceError> {
        Ok(())
    }

    /// Picks a column for `request.player`, or `None` if there is nothing
    /// to offer.
    async fn choose_column(
        &mut self,
        request: &SuggestionRequest,
    ) -> Result<Option<usize>, SourceError>;

    async fn shutdown(&mut self) -> Result<(), SourceError> {
        Ok(())
    }
}

/// Line input shared by all human players of a match.
pub type SharedInput<R> = Arc<Mutex<R>>;

/// A person typing column numbers from 1 to 7.
pub struct HumanPlayer<R> {
    name: String,
    input: SharedInput<R>,
}

impl<R: AsyncBufRead + Unpin + Send> HumanPlayer<R> {
    pub fn new(name: &str, input: SharedInput<R>) -> Self {
        Self {
            name: String::from(name),
            input,
        }
    }
}

/// Parses a typed, 1-based column number.
fn parse_column(line: &str) -> Option<usize> {
    match line.trim().parse::<usize>() {
        Ok(number) if (1..=COLS).contains(&number) => Some(number - 1),
        _ => None,
    }
}

#[async_trait::async_trait]
impl<R: AsyncBufRead + Unpin + Send> MoveSource for HumanPlayer<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PlayerKind {
        PlayerKind::Human
    }

    async fn choose_column(
        &mut self,
        request: &SuggestionRequest,
    ) -> Result<Option<usize>, SourceError> {
        let mut input = self.input.lock().await;
        let mut line = String::new();
        loop {
            println!(
                "{} (player {}), choose a column from 1 to {}:",
                self.name, request.player, COLS
            );
            line.clear();
            if input.read_line(&mut line).await? == 0 {
                return Err(SourceError::InputClosed);
            }
            match parse_column(&line) {
                Some(column) => return Ok(Some(column)),
                None => println!("'{}' is not a column", line.trim()),
            }
        }
    }
}

/// A bot executable that answers [`BotRequest`]s on its stdout.
pub struct ProcessBot {
    name: String,
    timeout: Duration,
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    // A re-usable buffer for IO.
    // Holds a partial line if a request was abandoned mid-read.
    buf: String,
    // The part of the current request line not yet written to the bot.
    outgoing: Vec<u8>,
    // Set while a request is in flight. Still set at the start of the next
    // request if the previous one was cancelled by a timeout.
    in_flight: bool,
}

impl ProcessBot {
    pub fn spawn(name: &str, cmd: &[String], timeout: Duration) -> anyhow::Result<Self> {
        let Some((program, args)) = cmd.split_first() else {
            anyhow::bail!("No command given for bot '{}'", name);
        };
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;
        let Some(stdin) = child.stdin.take() else {
            anyhow::bail!("Could not access stdin of bot '{}'", name);
        };
        let Some(stdout) = child.stdout.take() else {
            anyhow::bail!("Could not access stdout of bot '{}'", name);
        };
        debug!(name, program = %program, "Spawned bot");

        Ok(Self {
            name: String::from(name),
            timeout,
            child,
            stdin,
            stdout: BufReader::new(stdout),
            buf: String::new(),
            outgoing: Vec::new(),
            in_flight: false,
        })
    }

    async fn perform_request<T: DeserializeOwned>(
        &mut self,
        req: &BotRequest,
    ) -> Result<T, SourceError> {
        if self.in_flight {
            // Complete the abandoned request, its answer is still on its way
            debug!(name = %self.name, "Discarding late answer");
            self.write_outgoing().await?;
            self.read_line().await?;
        }
        let mut req_json = serde_json::to_string(req)?;
        trace!(name: "Sending request", player = &self.name, request = %req_json);
        req_json.push('\n');
        self.in_flight = true;
        self.outgoing = req_json.into_bytes();
        self.write_outgoing().await?;
        let serialized_response = self.read_line().await?;
        self.in_flight = false;
        trace!(name: "Received response", player = &self.name, response = %serialized_response);
        Ok(serde_json::from_str::<T>(&serialized_response)?)
    }

    // Unlike write_all(), a cancelled call leaves `outgoing` holding exactly
    // the bytes the bot has not received yet.
    async fn write_outgoing(&mut self) -> Result<(), SourceError> {
        while !self.outgoing.is_empty() {
            let num_bytes_written = self.stdin.write(&self.outgoing).await?;
            if num_bytes_written == 0 {
                return Err(SourceError::ProcessExited);
            }
            self.outgoing.drain(..num_bytes_written);
        }
        self.stdin.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, SourceError> {
        if self.stdout.read_line(&mut self.buf).await? == 0 {
            self.buf.clear();
            return Err(SourceError::ProcessExited);
        }
        let line = String::from(self.buf.trim_end());
        self.buf.clear();
        Ok(line)
    }
}

#[async_trait::async_trait]
impl MoveSource for ProcessBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PlayerKind {
        PlayerKind::Automated
    }

    fn timeout(&self) -> Option<Duration> {
        Some(self.timeout)
    }

    async fn new_round(&mut self, player: PlayerId) -> Result<(), SourceError> {
        let _: Okay = self.perform_request(&BotRequest::NewGame { player }).await?;
        Ok(())
    }

    async fn choose_column(
        &mut self,
        request: &SuggestionRequest,
    ) -> Result<Option<usize>, SourceError> {
        let player = PlayerId::try_from(request.player).map_err(|msg| {
            SourceError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, msg))
        })?;
        let response: SuggestionResponse = self
            .perform_request(&BotRequest::SuggestMove {
                board: request.board.clone(),
                player,
            })
            .await?;
        Ok(response.column)
    }

    async fn shutdown(&mut self) -> Result<(), SourceError> {
        let mut bye = serde_json::to_string(&BotRequest::Bye)?;
        bye.push('\n');
        let limit = self.timeout;
        let goodbye = async {
            self.write_outgoing().await?;
            self.stdin.write_all(bye.as_bytes()).await?;
            self.stdin.flush().await?;
            self.child.wait().await?;
            Ok::<(), SourceError>(())
        };
        match tokio::time::timeout(limit, goodbye).await {
            Ok(result) => result,
            Err(_) => {
                warn!(name = %self.name, "Bot did not exit in time, killing it");
                self.child.kill().await?;
                Ok(())
            }
        }
    }
}

/// The HTTP suggestion service.
pub struct HttpSuggester {
    name: String,
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpSuggester {
    pub fn new(name: &str, url: &str, timeout: Duration) -> Self {
        Self {
            name: String::from(name),
            url: String::from(url),
            timeout,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl MoveSource for HttpSuggester {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PlayerKind {
        PlayerKind::Automated
    }

    fn timeout(&self) -> Option<Duration> {
        Some(self.timeout)
    }

    async fn choose_column(
        &mut self,
        request: &SuggestionRequest,
    ) -> Result<Option<usize>, SourceError> {
        trace!(player = &self.name, url = &self.url, "Posting suggestion request");
        let response = self.client.post(&self.url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        trace!(player = &self.name, response = %body, "Received suggestion");
        let response: SuggestionResponse = serde_json::from_str(&body)?;
        Ok(response.column)
    }
}

/// Creates the move sources for a match. Human players share stdin.
pub fn sources_from_configs(
    configs: &[PlayerConfig; 2],
) -> anyhow::Result<[Box<dyn MoveSource>; 2]> {
    let stdin: SharedInput<_> = Arc::new(Mutex::new(BufReader::new(tokio::io::stdin())));
    let [first, second] = configs;
    Ok([
        source_from_config(first, &stdin)?,
        source_from_config(second, &stdin)?,
    ])
}

fn source_from_config<R>(
    config: &PlayerConfig,
    stdin: &SharedInput<R>,
) -> anyhow::Result<Box<dyn MoveSource>>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let timeout = config.source.timeout().unwrap_or_default();
    Ok(match &config.source {
        SourceConfig::Human => Box::new(HumanPlayer::new(&config.nick, Arc::clone(stdin))),
        SourceConfig::Process { cmd, .. } => {
            Box::new(ProcessBot::spawn(&config.nick, cmd, timeout)?)
        }
        SourceConfig::Http { url, .. } => Box::new(HttpSuggester::new(&config.nick, url, timeout)),
    })
}
