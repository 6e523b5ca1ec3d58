#![allow(dead_code)]

use dbfstream::{
    Error, ErrorKind,
    sans::{Header, Record},
    stream::{Demand, Sink},
};

/// Build a table in memory.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    version: u8,
    fields: Vec<(String, char, u8, u32)>,
    records: Vec<Vec<u8>>,
    record_count: Option<u32>,
    terminator: bool,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            version: 0x03,
            fields: vec![],
            records: vec![],
            record_count: None,
            terminator: true,
        }
    }

    pub fn version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// Add a field with a correct displacement.
    pub fn field(self, name: &str, kind: char, length: u8) -> Self {
        let displacement = self.record_length() as u32;
        self.field_at(name, kind, length, displacement)
    }

    /// Add a field with an arbitrary displacement.
    pub fn field_at(mut self, name: &str, kind: char, length: u8, displacement: u32) -> Self {
        self.fields.push((name.to_owned(), kind, length, displacement));
        self
    }

    /// Add a record, left-aligning each value within its field.
    pub fn record(mut self, marker: u8, values: &[&str]) -> Self {
        let mut r = vec![marker];
        for ((_, _, length, _), value) in self.fields.iter().zip(values) {
            let mut bytes = value.as_bytes().to_vec();
            bytes.resize(*length as usize, b' ');
            r.extend_from_slice(&bytes);
        }
        self.records.push(r);
        self
    }

    pub fn raw_record(mut self, bytes: &[u8]) -> Self {
        self.records.push(bytes.to_vec());
        self
    }

    /// Override the declared number of records.
    pub fn record_count(mut self, n: u32) -> Self {
        self.record_count = Some(n);
        self
    }

    pub fn without_terminator(mut self) -> Self {
        self.terminator = false;
        self
    }

    pub fn record_length(&self) -> u16 {
        1 + self.fields.iter().map(|f| f.2 as u16).sum::<u16>()
    }

    pub fn header_length(&self) -> u16 {
        32 + 32 * self.fields.len() as u16 + self.terminator as u16
    }

    pub fn build(&self) -> Vec<u8> {
        let mut r = vec![self.version, 124, 3, 15];
        let count = self.record_count.unwrap_or(self.records.len() as u32);
        r.extend_from_slice(&count.to_le_bytes());
        r.extend_from_slice(&self.header_length().to_le_bytes());
        r.extend_from_slice(&self.record_length().to_le_bytes());
        r.resize(32, 0);

        for (name, kind, length, displacement) in &self.fields {
            let mut entry = [0u8; 32];
            entry[..name.len()].copy_from_slice(name.as_bytes());
            entry[11] = *kind as u8;
            entry[12..16].copy_from_slice(&displacement.to_le_bytes());
            entry[16] = *length;
            r.extend_from_slice(&entry);
        }

        if self.terminator {
            r.push(0x0D);
        }

        for record in &self.records {
            r.extend_from_slice(record);
        }

        r
    }
}

/// A notification received by a [`Collector`].
#[derive(Debug)]
pub enum Event {
    Header(Header),
    Record(Record),
    Error(ErrorKind),
    End,
}

/// Sink recording every notification, optionally pausing after given records.
#[derive(Debug, Default)]
pub struct Collector {
    pub events: Vec<Event>,
    pub pause_after: Vec<u32>,
    pub errors: Vec<Error>,
}

impl Collector {
    pub fn pausing_after(sequences: &[u32]) -> Self {
        Self {
            pause_after: sequences.to_vec(),
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<&Record> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Record(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn sequences(&self) -> Vec<u32> {
        self.records().iter().map(|r| r.sequence).collect()
    }

    pub fn header_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Header(_)))
            .count()
    }

    pub fn error_kinds(&self) -> Vec<ErrorKind> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Error(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub fn end_count(&self) -> usize {
        self.events.iter().filter(|e| matches!(e, Event::End)).count()
    }
}

impl Sink for Collector {
    fn header(&mut self, header: &Header) {
        self.events.push(Event::Header(header.clone()));
    }

    fn record(&mut self, record: Record) -> Demand {
        let sequence = record.sequence;
        self.events.push(Event::Record(record));

        if self.pause_after.contains(&sequence) {
            Demand::Pause
        } else {
            Demand::More
        }
    }

    fn error(&mut self, error: Error) {
        self.events.push(Event::Error(error.kind()));
        self.errors.push(error);
    }

    fn end(&mut self) {
        self.events.push(Event::End);
    }
}

/// A small table of three records over character, numeric and logical fields.
pub fn people() -> TableBuilder {
    TableBuilder::new()
        .field("NAME", 'C', 10)
        .field("AGE", 'N', 3)
        .field("MEMBER", 'L', 1)
        .record(b' ', &["Ada", " 36", "T"])
        .record(b'*', &["Charles", " 79", "F"])
        .record(b' ', &["Grace", "", "t"])
}
