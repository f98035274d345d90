use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use connect4::{SuggestionFailure, SuggestionRequest, SuggestionResponse};
use serde::{Deserialize, Serialize};

/// Writes the exchanges with automated players to one JSON file per round.
pub struct Recorder {
    num: usize,
    directory: PathBuf,
    exchanges: Vec<Exchange>,
}

/// One request to an automated player and what came of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub player: String,
    pub request: SuggestionRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<SuggestionResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl Recorder {
    pub fn new(directory: PathBuf) -> anyhow::Result<Self> {
        if !directory.is_dir() {
            anyhow::bail!("Directory '{}' does not exist", directory.display());
        }
        Ok(Self {
            num: 1,
            directory,
            exchanges: Vec::new(),
        })
    }

    pub fn store_exchange(
        &mut self,
        player: &str,
        request: &SuggestionRequest,
        answer: &Result<Option<usize>, SuggestionFailure>,
    ) {
        let (response, failure) = match answer {
            Ok(column) => (Some(SuggestionResponse { column: *column }), None),
            Err(failure) => (None, Some(failure.to_string())),
        };
        self.exchanges.push(Exchange {
            player: String::from(player),
            request: request.clone(),
            response,
            failure,
        });
    }

    /// Writes the exchanges stored since the last call to
    /// `round_NNNNNN.json` and returns its path.
    pub fn write_round_recording(&mut self) -> anyhow::Result<PathBuf> {
        let filepath = self.directory.join(format!("round_{:0>6}.json", self.num));
        let writer = BufWriter::new(File::create(&filepath)?);
        serde_json::to_writer_pretty(writer, &std::mem::take(&mut self.exchanges))?;
        self.num += 1;
        Ok(filepath)
    }
}
