//! Purpose: Hold loaded records in file order plus a primary-key index.
//! Exports: `RecordStore`, `Plan`, `QueryOutcome`.
//! Role: Loads tab-delimited record files and answers scans and exact-key lookups.
//! Invariants: Scan results keep file order; index lookups are exact-key matches.
//! Invariants: A load either yields every record or fails naming the first bad line.
use std::fs;
use std::io;
use std::path::Path;

use bstr::ByteSlice;
use tracing::{debug, info};

use crate::core::error::{Error, ErrorKind};
use crate::core::filter::{Filter, QueryFilter};
use crate::core::parser::Query;
use crate::core::record::Record;
use crate::core::schema::{ColumnKind, Schema};
use crate::core::table::KeyedTable;

const FIELD_SEPARATOR: char = '\t';

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Plan {
    IndexLookup,
    Scan,
}

impl Plan {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IndexLookup => "index",
            Self::Scan => "scan",
        }
    }
}

#[derive(Debug)]
pub struct QueryOutcome<'a> {
    pub plan: Plan,
    pub records: Vec<&'a Record>,
}

#[derive(Debug)]
pub struct RecordStore {
    schema: Schema,
    records: Vec<Record>,
    index: KeyedTable<String, usize>,
}

impl RecordStore {
    pub fn load(path: &Path, schema: Schema) -> Result<Self, Error> {
        let bytes = fs::read(path).map_err(|err| {
            let kind = if err.kind() == io::ErrorKind::NotFound {
                ErrorKind::NotFound
            } else {
                ErrorKind::Io
            };
            Error::new(kind)
                .with_message("failed to read record file")
                .with_path(path)
                .with_source(err)
        })?;

        let mut lines = Vec::new();
        for (idx, line) in bytes.lines().enumerate() {
            let text = line.to_str().map_err(|err| {
                Error::new(ErrorKind::Load)
                    .with_message("line is not valid UTF-8")
                    .with_line(idx as u64 + 1)
                    .with_path(path)
                    .with_source(err)
            })?;
            lines.push(text);
        }

        let store = Self::from_lines(schema, lines).map_err(|err| err.with_path(path))?;
        info!(
            path = %path.display(),
            records = store.len(),
            "record file loaded"
        );
        Ok(store)
    }

    /// Builds a store from already-split lines; line numbers in errors are 1-based.
    pub fn from_lines<'l, I>(schema: Schema, lines: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = &'l str>,
    {
        let mut records = Vec::new();
        for (idx, line) in lines.into_iter().enumerate() {
            let line_no = idx as u64 + 1;
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                continue;
            }
            let record = parse_line(&schema, line).map_err(|err| {
                debug!(line = line_no, "rejected record line");
                err.with_line(line_no)
            })?;
            records.push((line_no, record));
        }

        let mut index = KeyedTable::with_capacity(records.len().max(1))?;
        for (position, (line_no, record)) in records.iter().enumerate() {
            let previous = index
                .put(record.key().to_string(), position)
                .map_err(|err| {
                    Error::new(ErrorKind::Load)
                        .with_message(format!("empty primary key ({})", schema.primary_key().name))
                        .with_line(*line_no)
                        .with_source(err)
                })?;
            if previous.is_some() {
                return Err(Error::new(ErrorKind::Load)
                    .with_message(format!("duplicate primary key: {}", record.key()))
                    .with_line(*line_no));
            }
        }

        Ok(Self {
            schema,
            records: records.into_iter().map(|(_, record)| record).collect(),
            index,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn lookup_by_key(&self, key: &str) -> Option<&Record> {
        self.index.get(key).map(|&position| &self.records[position])
    }

    /// Every record the filter accepts, in file order.
    pub fn scan<F: Filter + ?Sized>(&self, filter: &F) -> Result<Vec<&Record>, Error> {
        let mut out = Vec::new();
        for record in &self.records {
            if filter.accepts(record)? {
                out.push(record);
            }
        }
        Ok(out)
    }

    pub fn execute(&self, query: &Query) -> Result<QueryOutcome<'_>, Error> {
        if let Some(key) = query.index_key() {
            debug!(key, "using primary-key index");
            return Ok(QueryOutcome {
                plan: Plan::IndexLookup,
                records: self.lookup_by_key(key).into_iter().collect(),
            });
        }
        debug!(expressions = query.expressions().len(), "scanning records");
        let filter = QueryFilter::new(query.expressions().to_vec());
        Ok(QueryOutcome {
            plan: Plan::Scan,
            records: self.scan(&filter)?,
        })
    }
}

fn parse_line(schema: &Schema, line: &str) -> Result<Record, Error> {
    let fields = line.split(FIELD_SEPARATOR).collect::<Vec<_>>();
    if fields.len() != schema.len() {
        return Err(Error::new(ErrorKind::Load)
            .with_message(format!(
                "malformed line: expected {} fields, found {}: {line}",
                schema.len(),
                fields.len()
            ))
            .with_hint("Fields are separated by a single tab character."));
    }

    let mut values = Vec::with_capacity(fields.len());
    for (column, field) in schema.columns().iter().zip(fields) {
        let value = match column.kind {
            ColumnKind::Text => field.to_string(),
            ColumnKind::Integer => field
                .trim()
                .parse::<i64>()
                .map_err(|err| {
                    Error::new(ErrorKind::Load)
                        .with_message(format!(
                            "malformed line: {} is not an integer: {line}",
                            column.name
                        ))
                        .with_source(err)
                })?
                .to_string(),
        };
        values.push(value);
    }
    Ok(Record::new(values))
}

#[cfg(test)]
mod tests {
    use super::{Plan, RecordStore};
    use crate::core::error::ErrorKind;
    use crate::core::parser::Query;
    use crate::core::schema::Schema;
    use std::io::Write;

    const STUDENTS: &str = "0000000001\tAkšamović\tMarin\t2\n\
                            0000000002\tBakamović\tPetra\t3\n\
                            0000000003\tBosnić\tAndrea\t4\n\
                            0000000004\tBožić\tMarin\t5\n";

    fn students() -> RecordStore {
        RecordStore::from_lines(Schema::students(), STUDENTS.lines()).expect("store")
    }

    fn keys(records: &[&crate::core::record::Record]) -> Vec<String> {
        records.iter().map(|r| r.key().to_string()).collect()
    }

    #[test]
    fn lookup_by_key_uses_the_index() {
        let store = students();
        assert_eq!(store.len(), 4);
        assert_eq!(store.lookup_by_key("0000000003").unwrap().value(1), "Bosnić");
        assert!(store.lookup_by_key("0000000009").is_none());
    }

    #[test]
    fn scan_keeps_file_order() {
        let store = students();
        let query = Query::compile(r#"firstName="Marin""#, store.schema()).unwrap();
        let outcome = store.execute(&query).unwrap();
        assert_eq!(outcome.plan, Plan::Scan);
        assert_eq!(keys(&outcome.records), vec!["0000000001", "0000000004"]);
    }

    #[test]
    fn key_equality_takes_the_index_path() {
        let store = students();
        let query = Query::compile(r#"jmbag="0000000002""#, store.schema()).unwrap();
        let outcome = store.execute(&query).unwrap();
        assert_eq!(outcome.plan, Plan::IndexLookup);
        assert_eq!(keys(&outcome.records), vec!["0000000002"]);

        let missing = Query::compile(r#"jmbag="0000000042""#, store.schema()).unwrap();
        assert!(store.execute(&missing).unwrap().records.is_empty());
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let store = students();
        let query = Query::compile(r#"lastName LIKE "Z*""#, store.schema()).unwrap();
        assert!(store.execute(&query).unwrap().records.is_empty());
    }

    #[test]
    fn query_from_a_wider_schema_is_a_usage_error() {
        let schema: Schema = "id,name".parse().expect("schema");
        let store = RecordStore::from_lines(schema, ["1\tA"]).expect("store");
        let query = Query::compile(r#"finalGrade="5""#, &Schema::students()).unwrap();
        let err = store.execute(&query).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.hint().is_some());

        // Column 0 exists in every record, so key lookups still work.
        let query = Query::compile(r#"jmbag="1""#, &Schema::students()).unwrap();
        assert_eq!(keys(&store.execute(&query).unwrap().records), vec!["1"]);
    }

    #[test]
    fn wrong_field_count_names_the_line() {
        let lines = ["0000000001\tAkšamović\tMarin\t2", "0000000002\tBakamović\t3"];
        let err = RecordStore::from_lines(Schema::students(), lines).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn bad_integer_names_the_line() {
        let lines = ["0000000001\tAkšamović\tMarin\tdva"];
        let err = RecordStore::from_lines(Schema::students(), lines).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn duplicate_and_empty_keys_fail_the_load() {
        let dup = ["1\ta\tb\t2", "1\tc\td\t3"];
        let err = RecordStore::from_lines(Schema::students(), dup).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert_eq!(err.line(), Some(2));

        let empty = ["1\ta\tb\t2", "", "\tc\td\t3"];
        let err = RecordStore::from_lines(Schema::students(), empty).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn blank_lines_and_crlf_are_tolerated() {
        let lines = ["1\ta\tb\t2\r", "", "2\tc\td\t+3"];
        let store = RecordStore::from_lines(Schema::students(), lines).expect("store");
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0].value(3), "2");
        assert_eq!(store.records()[1].value(3), "3");
    }

    #[test]
    fn empty_input_builds_an_empty_store() {
        let store = RecordStore::from_lines(Schema::students(), []).expect("store");
        assert!(store.is_empty());
        assert!(store.lookup_by_key("1").is_none());
    }

    #[test]
    fn load_reads_files_and_reports_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("database.txt");
        let mut file = std::fs::File::create(&path).expect("create");
        file.write_all(STUDENTS.as_bytes()).expect("write");
        let store = RecordStore::load(&path, Schema::students()).expect("load");
        assert_eq!(store.len(), 4);

        let missing = dir.path().join("missing.txt");
        let err = RecordStore::load(&missing, Schema::students()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.path(), Some(missing.as_path()));

        std::fs::write(&path, b"1\ta\t\xff\t2\n").expect("write");
        let err = RecordStore::load(&path, Schema::students()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert_eq!(err.line(), Some(1));
    }
}
