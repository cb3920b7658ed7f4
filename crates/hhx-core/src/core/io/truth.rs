use crate::core::io::traits::EventFile;
use crate::core::models::event::{EventInfo, EventStore};
use crate::core::models::particle::{FourMomentum, Particle};
use crate::core::models::species::PdgId;
use crate::core::models::table::{ParticleTableBuilder, TableBuildError};
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TruthFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: TruthParseErrorKind,
    },
    #[error("Record '{record}' on line {line} must appear {expected}")]
    OutOfScope {
        line: usize,
        record: String,
        expected: &'static str,
    },
    #[error("Invalid particle collection closed on line {line}: {source}")]
    Table {
        line: usize,
        #[source]
        source: TableBuildError,
    },
    #[error("Duplicate collection '{name}' on line {line}")]
    DuplicateCollection { line: usize, name: String },
    #[error("Event opened on line {line} is never closed with END")]
    UnterminatedEvent { line: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TruthParseErrorKind {
    #[error("Invalid integer for field '{field}' (value: '{value}')")]
    InvalidInt { field: &'static str, value: String },
    #[error("Invalid float for field '{field}' (value: '{value}')")]
    InvalidFloat { field: &'static str, value: String },
    #[error("Required field '{field}' is missing")]
    MissingField { field: &'static str },
    #[error("Unknown record type '{0}'")]
    UnknownRecord(String),
}

struct OpenCollection {
    name: String,
    builder: ParticleTableBuilder,
}

struct OpenEvent {
    opened_at: usize,
    store: EventStore,
    collection: Option<OpenCollection>,
}

impl OpenEvent {
    fn close_collection(&mut self, line: usize) -> Result<(), TruthFileError> {
        let Some(open) = self.collection.take() else {
            return Ok(());
        };
        let table = open
            .builder
            .build()
            .map_err(|source| TruthFileError::Table { line, source })?;
        if !self.store.insert_collection(&open.name, table) {
            return Err(TruthFileError::DuplicateCollection {
                line,
                name: open.name,
            });
        }
        Ok(())
    }
}

fn field<'a>(
    parts: &[&'a str],
    index: usize,
    name: &'static str,
    line: usize,
) -> Result<&'a str, TruthFileError> {
    parts.get(index).copied().ok_or(TruthFileError::Parse {
        line,
        kind: TruthParseErrorKind::MissingField { field: name },
    })
}

fn parse_int<T: FromStr>(
    parts: &[&str],
    index: usize,
    name: &'static str,
    line: usize,
) -> Result<T, TruthFileError> {
    let value = field(parts, index, name, line)?;
    value.parse().map_err(|_| TruthFileError::Parse {
        line,
        kind: TruthParseErrorKind::InvalidInt {
            field: name,
            value: value.into(),
        },
    })
}

fn parse_float(
    parts: &[&str],
    index: usize,
    name: &'static str,
    line: usize,
) -> Result<f64, TruthFileError> {
    let value = field(parts, index, name, line)?;
    value.parse().map_err(|_| TruthFileError::Parse {
        line,
        kind: TruthParseErrorKind::InvalidFloat {
            field: name,
            value: value.into(),
        },
    })
}

fn require_event<'a>(
    event: &'a mut Option<OpenEvent>,
    record: &str,
    line: usize,
) -> Result<&'a mut OpenEvent, TruthFileError> {
    event.as_mut().ok_or_else(|| TruthFileError::OutOfScope {
        line,
        record: record.to_string(),
        expected: "between BEGIN and END",
    })
}

fn require_collection<'a>(
    event: &'a mut Option<OpenEvent>,
    record: &str,
    line: usize,
) -> Result<&'a mut OpenCollection, TruthFileError> {
    require_event(event, record, line)?
        .collection
        .as_mut()
        .ok_or_else(|| TruthFileError::OutOfScope {
            line,
            record: record.to_string(),
            expected: "after a COLLECTION record",
        })
}

/// Line-oriented text format for generator truth records.
///
/// ```text
/// BEGIN
/// INFO EventInfo 284500 1001 999001
/// COLLECTION TruthParticles
/// PART 1 1000022 62 500000 0.5 1.2 300000 650000
/// DECAY 1 2 3
/// END
/// ```
pub struct TruthFile;

/// Streams events from a truth-record input, one `BEGIN`..`END` block at a time.
///
/// Iteration stops after the first error.
pub struct TruthReader<R> {
    lines: io::Lines<R>,
    line_num: usize,
    current: Option<OpenEvent>,
    finished: bool,
}

impl<R: BufRead> TruthReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_num: 0,
            current: None,
            finished: false,
        }
    }

    fn next_event(&mut self) -> Result<Option<EventStore>, TruthFileError> {
        while let Some(line_res) = self.lines.next() {
            let line = line_res?;
            self.line_num += 1;
            let line_num = self.line_num;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            match parts[0] {
                "BEGIN" => {
                    if self.current.is_some() {
                        return Err(TruthFileError::OutOfScope {
                            line: line_num,
                            record: "BEGIN".into(),
                            expected: "after the previous event is closed",
                        });
                    }
                    self.current = Some(OpenEvent {
                        opened_at: line_num,
                        store: EventStore::new(),
                        collection: None,
                    });
                }
                "INFO" => {
                    let key = field(&parts, 1, "key", line_num)?;
                    let info = EventInfo {
                        run_number: parse_int(&parts, 2, "run", line_num)?,
                        event_number: parse_int(&parts, 3, "event", line_num)?,
                        channel_number: parse_int(&parts, 4, "channel", line_num)?,
                    };
                    require_event(&mut self.current, "INFO", line_num)?
                        .store
                        .set_info(key, info);
                }
                "COLLECTION" => {
                    let name = field(&parts, 1, "name", line_num)?;
                    let event = require_event(&mut self.current, "COLLECTION", line_num)?;
                    event.close_collection(line_num)?;
                    event.collection = Some(OpenCollection {
                        name: name.to_string(),
                        builder: ParticleTableBuilder::new(),
                    });
                }
                "PART" => {
                    let barcode: i64 = parse_int(&parts, 1, "barcode", line_num)?;
                    let pdg_id: i32 = parse_int(&parts, 2, "pdgId", line_num)?;
                    let status: i32 = parse_int(&parts, 3, "status", line_num)?;
                    let momentum = FourMomentum {
                        pt: parse_float(&parts, 4, "pt", line_num)?,
                        eta: parse_float(&parts, 5, "eta", line_num)?,
                        phi: parse_float(&parts, 6, "phi", line_num)?,
                        m: parse_float(&parts, 7, "m", line_num)?,
                        e: parse_float(&parts, 8, "e", line_num)?,
                    };
                    let particle = Particle::new(barcode, PdgId(pdg_id), status, momentum);
                    require_collection(&mut self.current, "PART", line_num)?
                        .builder
                        .add_particle(particle)
                        .map_err(|source| TruthFileError::Table {
                            line: line_num,
                            source,
                        })?;
                }
                "DECAY" => {
                    let parent: i64 = parse_int(&parts, 1, "barcode", line_num)?;
                    field(&parts, 2, "child", line_num)?;
                    let children = (2..parts.len())
                        .map(|i| parse_int(&parts, i, "child", line_num))
                        .collect::<Result<Vec<i64>, _>>()?;
                    require_collection(&mut self.current, "DECAY", line_num)?
                        .builder
                        .add_decay_by_barcode(parent, children);
                }
                "END" => {
                    let mut event = self.current.take().ok_or_else(|| TruthFileError::OutOfScope {
                        line: line_num,
                        record: "END".into(),
                        expected: "after BEGIN",
                    })?;
                    event.close_collection(line_num)?;
                    return Ok(Some(event.store));
                }
                other => {
                    return Err(TruthFileError::Parse {
                        line: line_num,
                        kind: TruthParseErrorKind::UnknownRecord(other.to_string()),
                    });
                }
            }
        }

        match self.current.take() {
            Some(event) => Err(TruthFileError::UnterminatedEvent {
                line: event.opened_at,
            }),
            None => Ok(None),
        }
    }
}

impl<R: BufRead> Iterator for TruthReader<R> {
    type Item = Result<EventStore, TruthFileError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let next = self.next_event().transpose();
        if !matches!(next, Some(Ok(_))) {
            self.finished = true;
        }
        next
    }
}

impl EventFile for TruthFile {
    type Error = TruthFileError;
    type Reader<R: BufRead> = TruthReader<R>;

    fn reader<R: BufRead>(reader: R) -> Self::Reader<R> {
        TruthReader::new(reader)
    }

    fn write_to(events: &[EventStore], writer: &mut impl Write) -> Result<(), Self::Error> {
        writeln!(writer, "# Generated by hhxtruth")?;
        for event in events {
            writeln!(writer, "BEGIN")?;
            if let Some((key, info)) = event.info_entry() {
                writeln!(
                    writer,
                    "INFO {} {} {} {}",
                    key, info.run_number, info.event_number, info.channel_number
                )?;
            }
            for (name, table) in event.collections() {
                writeln!(writer, "COLLECTION {}", name)?;
                for (_, p) in table.iter() {
                    let m = &p.momentum;
                    writeln!(
                        writer,
                        "PART {} {} {} {} {} {} {} {}",
                        p.barcode,
                        p.pdg_id.code(),
                        p.status,
                        m.pt,
                        m.eta,
                        m.phi,
                        m.m,
                        m.e
                    )?;
                }
                for (id, p) in table.iter() {
                    if p.children().is_empty() {
                        continue;
                    }
                    write!(writer, "DECAY {}", p.barcode)?;
                    for (_, child) in table.children_of(id) {
                        write!(writer, " {}", child.barcode)?;
                    }
                    writeln!(writer)?;
                }
            }
            writeln!(writer, "END")?;
        }
        Ok(())
    }
}
