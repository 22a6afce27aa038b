//! Hand-off point towards the transaction-submission client.
//!
//! Signing and encoding the chosen sequence as an on-chain command happens
//! downstream; this crate only emits the sequence.

use crate::error::CfResult;
use crate::pool::Recommendation;
use serde::Serialize;
use std::io::Write;

pub trait CombinationSink {
    fn submit(&mut self, recommendation: &Recommendation) -> CfResult<()>;
}

#[derive(Serialize)]
struct SubmissionRecord<'a> {
    sequence: &'a [usize],
    score: i64,
}

/// Writes one JSON object per submitted sequence, newline delimited.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    submitted: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            submitted: 0,
        }
    }

    pub fn submitted(&self) -> usize {
        self.submitted
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> CombinationSink for JsonLinesSink<W> {
    fn submit(&mut self, recommendation: &Recommendation) -> CfResult<()> {
        let record = SubmissionRecord {
            sequence: &recommendation.sequence,
            score: recommendation.score,
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.submitted += 1;
        Ok(())
    }
}
