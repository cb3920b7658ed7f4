use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NtupleError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Branch list is empty")]
    EmptySchema,
    #[error("Branch '{0}' is declared more than once")]
    DuplicateBranch(String),
    #[error("Branches have already been set up")]
    SchemaAlreadyDefined,
    #[error("Cannot fill before branches are set up")]
    SchemaNotDefined,
    #[error("Record does not match the declared branches: {0}")]
    RecordMismatch(String),
}

/// Value stored in one ntuple branch for one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl FieldValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            FieldValue::Int(v) => v as f64,
            FieldValue::UInt(v) => v as f64,
            FieldValue::Float(v) => v,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::UInt(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// One output row: branch names paired with their values, in branch order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NtupleRecord {
    fields: Vec<(String, FieldValue)>,
}

impl NtupleRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Appends a value, or overwrites it if the branch is already set.
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.iter().map(|(_, v)| v)
    }
}

/// Destination of flat per-event rows.
///
/// The schema is fixed once by [`NtupleSink::setup_branches`]; every filled
/// record must then carry exactly those branches, in that order.
pub trait NtupleSink {
    fn setup_branches(&mut self, branches: &[String]) -> Result<(), NtupleError>;
    fn fill(&mut self, record: &NtupleRecord) -> Result<(), NtupleError>;
    fn flush(&mut self) -> Result<(), NtupleError>;
}

fn validate_schema(branches: &[String]) -> Result<(), NtupleError> {
    if branches.is_empty() {
        return Err(NtupleError::EmptySchema);
    }
    let mut seen = HashSet::new();
    for name in branches {
        if !seen.insert(name.as_str()) {
            return Err(NtupleError::DuplicateBranch(name.clone()));
        }
    }
    Ok(())
}

fn check_record(branches: &[String], record: &NtupleRecord) -> Result<(), NtupleError> {
    if record.len() != branches.len() {
        return Err(NtupleError::RecordMismatch(format!(
            "expected {} branches, got {}",
            branches.len(),
            record.len()
        )));
    }
    for (expected, found) in branches.iter().zip(record.names()) {
        if expected != found {
            return Err(NtupleError::RecordMismatch(format!(
                "expected branch '{}', found '{}'",
                expected, found
            )));
        }
    }
    Ok(())
}

/// Writes ntuple rows as CSV, with the branch names as header row.
pub struct CsvNtupleWriter<W: Write> {
    writer: csv::Writer<W>,
    branches: Option<Vec<String>>,
}

impl CsvNtupleWriter<File> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, NtupleError> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> CsvNtupleWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
            branches: None,
        }
    }

    pub fn into_inner(self) -> Result<W, NtupleError> {
        self.writer
            .into_inner()
            .map_err(|e| NtupleError::Io(io::Error::new(e.error().kind(), e.error().to_string())))
    }
}

impl<W: Write> NtupleSink for CsvNtupleWriter<W> {
    fn setup_branches(&mut self, branches: &[String]) -> Result<(), NtupleError> {
        if self.branches.is_some() {
            return Err(NtupleError::SchemaAlreadyDefined);
        }
        validate_schema(branches)?;
        self.writer.write_record(branches)?;
        self.branches = Some(branches.to_vec());
        Ok(())
    }

    fn fill(&mut self, record: &NtupleRecord) -> Result<(), NtupleError> {
        let branches = self.branches.as_ref().ok_or(NtupleError::SchemaNotDefined)?;
        check_record(branches, record)?;
        self.writer
            .write_record(record.values().map(|v| v.to_string()))?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), NtupleError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps the schema and all filled rows in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNtuple {
    branches: Option<Vec<String>>,
    records: Vec<NtupleRecord>,
}

impl InMemoryNtuple {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn branches(&self) -> Option<&[String]> {
        self.branches.as_deref()
    }

    pub fn records(&self) -> &[NtupleRecord] {
        &self.records
    }
}

impl NtupleSink for InMemoryNtuple {
    fn setup_branches(&mut self, branches: &[String]) -> Result<(), NtupleError> {
        if self.branches.is_some() {
            return Err(NtupleError::SchemaAlreadyDefined);
        }
        validate_schema(branches)?;
        self.branches = Some(branches.to_vec());
        Ok(())
    }

    fn fill(&mut self, record: &NtupleRecord) -> Result<(), NtupleError> {
        let branches = self.branches.as_ref().ok_or(NtupleError::SchemaNotDefined)?;
        check_record(branches, record)?;
        self.records.push(record.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), NtupleError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branches(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn record(values: &[(&str, FieldValue)]) -> NtupleRecord {
        let mut record = NtupleRecord::new();
        for (name, value) in values {
            record.set(*name, *value);
        }
        record
    }

    #[test]
    fn record_set_overwrites_existing_branch() {
        let mut rec = NtupleRecord::new();
        rec.set("runNumber", FieldValue::Int(1));
        rec.set("N1_Pt", FieldValue::Float(0.5));
        rec.set("runNumber", FieldValue::Int(2));

        assert_eq!(rec.len(), 2);
        assert_eq!(rec.get("runNumber"), Some(FieldValue::Int(2)));
        assert_eq!(rec.names().collect::<Vec<_>>(), vec!["runNumber", "N1_Pt"]);
        assert!(rec.get("missing").is_none());
    }

    #[test]
    fn schema_validation_rejects_empty_and_duplicates() {
        let mut sink = InMemoryNtuple::new();
        assert!(matches!(
            sink.setup_branches(&[]),
            Err(NtupleError::EmptySchema)
        ));
        assert!(matches!(
            sink.setup_branches(&branches(&["a", "b", "a"])),
            Err(NtupleError::DuplicateBranch(name)) if name == "a"
        ));
        sink.setup_branches(&branches(&["a", "b"])).unwrap();
        assert!(matches!(
            sink.setup_branches(&branches(&["c"])),
            Err(NtupleError::SchemaAlreadyDefined)
        ));
    }

    #[test]
    fn fill_before_setup_fails() {
        let mut sink = InMemoryNtuple::new();
        let rec = record(&[("a", FieldValue::Int(1))]);
        assert!(matches!(sink.fill(&rec), Err(NtupleError::SchemaNotDefined)));
    }

    #[test]
    fn partial_or_reordered_records_are_refused() {
        let mut sink = InMemoryNtuple::new();
        sink.setup_branches(&branches(&["a", "b"])).unwrap();

        let partial = record(&[("a", FieldValue::Int(1))]);
        assert!(matches!(
            sink.fill(&partial),
            Err(NtupleError::RecordMismatch(_))
        ));

        let reordered = record(&[("b", FieldValue::Int(1)), ("a", FieldValue::Int(2))]);
        assert!(matches!(
            sink.fill(&reordered),
            Err(NtupleError::RecordMismatch(_))
        ));
        assert!(sink.records().is_empty());
    }

    #[test]
    fn csv_writer_emits_header_and_rows() {
        let mut sink = CsvNtupleWriter::new(Vec::new());
        sink.setup_branches(&branches(&["eventNumber", "N1_Pt", "N1_Eta"]))
            .unwrap();
        sink.fill(&record(&[
            ("eventNumber", FieldValue::Int(42)),
            ("N1_Pt", FieldValue::Float(0.5)),
            ("N1_Eta", FieldValue::Float(-1.25)),
        ]))
        .unwrap();
        sink.flush().unwrap();

        let bytes = sink.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "eventNumber,N1_Pt,N1_Eta\n42,0.5,-1.25\n");
    }

    #[test]
    fn csv_writer_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.csv");
        {
            let mut sink = CsvNtupleWriter::create(&path).unwrap();
            sink.setup_branches(&branches(&["x"])).unwrap();
            sink.fill(&record(&[("x", FieldValue::Float(2.0))])).unwrap();
            sink.flush().unwrap();
        }
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "x\n2\n");
    }

    #[test]
    fn field_value_conversions() {
        assert_eq!(FieldValue::Int(2).as_f64(), 2.0);
        assert_eq!(FieldValue::UInt(u64::MAX).to_string(), "18446744073709551615");
        assert_eq!(FieldValue::Float(0.08).to_string(), "0.08");
    }
}
