//! Line-oriented terminal prompts that re-ask until the answer parses.

use crate::error::InputError;
use anyhow::Result;
use chrono::NaiveDate;
use std::collections::VecDeque;
use std::future::Future;
use std::io::{self, BufRead, Write};

/// Where answers come from.
pub trait LineSource {
    /// The next line without its terminator, or `None` once input is exhausted.
    fn next_line(&mut self) -> impl Future<Output = io::Result<Option<String>>>;
}

/// Reads the process's standard input, one blocking read per requested line.
///
/// Nothing reads stdin between prompts, so a full-screen view can own the
/// terminal in the meantime.
#[derive(Debug, Default)]
pub struct StdinLines;

impl LineSource for StdinLines {
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        tokio::task::spawn_blocking(|| -> io::Result<Option<String>> {
            let mut line = String::new();
            match io::stdin().lock().read_line(&mut line)? {
                0 => Ok(None),
                _ => Ok(Some(strip_line_ending(line))),
            }
        })
        .await
        .map_err(io::Error::other)?
    }
}

/// Canned answers, used by tests and scripted runs.
#[derive(Debug, Default)]
pub struct ScriptedLines {
    lines: VecDeque<String>,
}

impl ScriptedLines {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedLines {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl LineSource for ScriptedLines {
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

fn strip_line_ending(mut line: String) -> String {
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    line
}

pub fn parse_date(input: &str) -> Result<NaiveDate, InputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(InputError::Required);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| InputError::BadDate(trimmed.to_string()))
}

/// Blank means "no date".
pub fn parse_optional_date(input: &str) -> Result<Option<NaiveDate>, InputError> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    parse_date(input).map(Some)
}

pub fn parse_integer(input: &str) -> Result<i64, InputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(InputError::Required);
    }
    trimmed
        .parse()
        .map_err(|_| InputError::NotANumber(trimmed.to_string()))
}

/// A non-negative count that fits an `INTEGER` column.
pub fn parse_count(input: &str) -> Result<i32, InputError> {
    let value = parse_integer(input)?;
    if value < 0 {
        return Err(InputError::Negative(value));
    }
    i32::try_from(value).map_err(|_| InputError::NotANumber(input.trim().to_string()))
}

pub fn parse_required(input: &str) -> Result<String, InputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        Err(InputError::Required)
    } else {
        Ok(trimmed.to_string())
    }
}

pub struct Prompter<L, W> {
    lines: L,
    out: W,
}

impl<L: LineSource, W: Write> Prompter<L, W> {
    pub fn new(lines: L, out: W) -> Self {
        Prompter { lines, out }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_parts(self) -> (L, W) {
        (self.lines, self.out)
    }

    /// Prints `label` and returns the raw answer.
    pub async fn line(&mut self, label: &str) -> Result<String> {
        write!(self.out, "{}", label)?;
        self.out.flush()?;
        match self.lines.next_line().await? {
            Some(line) => Ok(line),
            None => Err(InputError::EndOfInput.into()),
        }
    }

    /// Asks until `parse` accepts the answer, printing each rejection.
    pub async fn ask<T, F>(&mut self, label: &str, parse: F) -> Result<T>
    where
        F: Fn(&str) -> Result<T, InputError>,
    {
        loop {
            let answer = self.line(label).await?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(e) => writeln!(self.out, "{}", e)?,
            }
        }
    }

    /// Free text; blank is allowed.
    pub async fn text(&mut self, label: &str) -> Result<String> {
        Ok(self.line(label).await?.trim().to_string())
    }

    pub async fn required_text(&mut self, label: &str) -> Result<String> {
        self.ask(label, parse_required).await
    }

    pub async fn date(&mut self, label: &str) -> Result<NaiveDate> {
        self.ask(label, parse_date).await
    }

    pub async fn optional_date(&mut self, label: &str) -> Result<Option<NaiveDate>> {
        self.ask(label, parse_optional_date).await
    }

    pub async fn count(&mut self, label: &str) -> Result<i32> {
        self.ask(label, parse_count).await
    }

    pub async fn integer(&mut self, label: &str) -> Result<i64> {
        self.ask(label, parse_integer).await
    }
}

/// True when `err` means the terminal has no more input.
pub fn is_end_of_input(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<InputError>(), Some(InputError::EndOfInput))
}
