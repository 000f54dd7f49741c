//! Interactive input from the terminal

use crate::core::traits::InputSource;
use async_trait::async_trait;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};

/// Reads operator answers from stdin
pub struct StdinInput {
    reader: BufReader<Stdin>,
}

impl StdinInput {
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(io::stdin()),
        }
    }
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InputSource for StdinInput {
    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        let mut answer = String::new();
        if self.reader.read_line(&mut answer).await? == 0 {
            return Ok(None);
        }

        Ok(Some(answer.trim_end_matches(['\r', '\n']).to_string()))
    }
}
