use crate::domain::model::{CandidateRecord, DecodePolicy, FIELD_NAMES};
use std::io::{BufRead, BufReader, Read};

pub const DELIMITER: u8 = b'|';

const BOM: &[u8] = b"\xef\xbb\xbf";

/// Lazy, single-pass iterator turning raw transaction lines into
/// [`CandidateRecord`]s. It never rejects a line; undecodable lines and lines
/// with the wrong field count are forwarded with a status marker.
///
/// Fields are split on `|` with no quoting, so quote characters are literal.
/// Line numbers are 1-based physical lines, blank lines included.
pub struct RecordParser<R: Read> {
    reader: BufReader<R>,
    buf: Vec<u8>,
    line: usize,
    policy: DecodePolicy,
    at_first_record: bool,
}

pub fn parse_candidates<R: Read>(reader: R, policy: DecodePolicy) -> RecordParser<R> {
    RecordParser {
        reader: BufReader::new(reader),
        buf: Vec::new(),
        line: 0,
        policy,
        at_first_record: true,
    }
}

impl<R: Read> RecordParser<R> {
    /// Next physical line without its terminator, or `None` at end of input.
    fn next_line(&mut self) -> Option<&[u8]> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => return None,
            Ok(_) => {}
            Err(err) => {
                tracing::error!("Stopped reading input after line {}: {}", self.line, err);
                return None;
            }
        }
        self.line += 1;

        let mut bytes = self.buf.as_slice();
        if let Some(rest) = bytes.strip_suffix(b"\n") {
            bytes = rest;
        }
        if let Some(rest) = bytes.strip_suffix(b"\r") {
            bytes = rest;
        }
        if self.line == 1 {
            if let Some(rest) = bytes.strip_prefix(BOM) {
                bytes = rest;
            }
        }
        Some(bytes)
    }
}

impl<R: Read> Iterator for RecordParser<R> {
    type Item = CandidateRecord;

    fn next(&mut self) -> Option<CandidateRecord> {
        loop {
            let policy = self.policy;
            let fields = decode_fields(self.next_line()?, policy);
            let line = self.line;

            let Some(fields) = fields else {
                tracing::debug!("Line {} is not valid UTF-8", line);
                self.at_first_record = false;
                return Some(CandidateRecord::decode_failure(line));
            };

            if is_blank(&fields) {
                continue;
            }

            if std::mem::replace(&mut self.at_first_record, false) && is_header(&fields) {
                tracing::debug!("Skipping header on line {}", line);
                continue;
            }

            return Some(CandidateRecord::from_fields(line, fields));
        }
    }
}

fn decode_fields(line: &[u8], policy: DecodePolicy) -> Option<Vec<String>> {
    let fields = || line.split(|&b| b == DELIMITER);
    let strict: Option<Vec<String>> = fields()
        .map(|field| std::str::from_utf8(field).ok().map(str::to_owned))
        .collect();

    match (strict, policy) {
        (Some(fields), _) => Some(fields),
        (None, DecodePolicy::Latin1Fallback) => Some(fields().map(decode_latin1).collect()),
        (None, DecodePolicy::Strict) => None,
    }
}

// ISO-8859-1 maps every byte to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn is_blank(fields: &[String]) -> bool {
    fields.len() <= 1 && fields.iter().all(|f| f.trim().is_empty())
}

fn is_header(fields: &[String]) -> bool {
    fields.len() == FIELD_NAMES.len()
        && fields
            .iter()
            .zip(FIELD_NAMES)
            .all(|(field, name)| field.trim().eq_ignore_ascii_case(name))
}
