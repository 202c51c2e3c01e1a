//! Purpose: Describe record columns and resolve attribute names to field getters.
//! Exports: `Schema`, `Column`, `ColumnKind`, `FieldGetter`.
//! Role: Owns the name→getter registry consulted by the query parser.
//! Invariants: Column 0 is the primary key; names are unique identifiers.
//! Invariants: The registry is built once per schema and never mutated afterwards.
use std::fmt;
use std::str::FromStr;

use crate::core::error::{Error, ErrorKind};
use crate::core::operator::LIKE_KEYWORD;
use crate::core::record::Record;
use crate::core::table::KeyedTable;

pub const STUDENT_COLUMNS: &str = "jmbag,lastName,firstName,finalGrade:int";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ColumnKind {
    Text,
    Integer,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

#[derive(Clone, Debug)]
pub struct Schema {
    columns: Vec<Column>,
    getters: KeyedTable<String, usize>,
}

/// Reads one column of a record. Resolved by name through [`Schema::getter`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldGetter {
    index: usize,
}

impl FieldGetter {
    pub fn index(self) -> usize {
        self.index
    }

    /// Fails with `Usage` when the record is narrower than the schema the getter came from.
    pub fn get(self, record: &Record) -> Result<&str, Error> {
        record.get(self.index).ok_or_else(|| {
            Error::new(ErrorKind::Usage)
                .with_message(format!(
                    "column {} is out of range for a record with {} fields",
                    self.index,
                    record.values().len()
                ))
                .with_hint("Compile the query against the schema of the store it runs on.")
        })
    }

    pub fn is_primary_key(self) -> bool {
        self.index == 0
    }
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Result<Self, Error> {
        if columns.is_empty() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("schema needs at least one column")
                .with_hint(format!("Example: --columns {STUDENT_COLUMNS}")));
        }
        let getters = registry(&columns)?;
        Ok(Self { columns, getters })
    }

    /// `jmbag` (key), `lastName`, `firstName`, `finalGrade` (integer).
    pub fn students() -> Self {
        let text = |name: &str| Column {
            name: name.to_string(),
            kind: ColumnKind::Text,
        };
        let columns = vec![
            text("jmbag"),
            text("lastName"),
            text("firstName"),
            Column {
                name: "finalGrade".to_string(),
                kind: ColumnKind::Integer,
            },
        ];
        let getters = registry(&columns);
        debug_assert!(getters.is_ok(), "student columns are valid");
        Self {
            columns,
            getters: getters.unwrap_or_default(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn primary_key(&self) -> &Column {
        &self.columns[0]
    }

    pub fn getter(&self, name: &str) -> Option<FieldGetter> {
        self.getters.get(name).map(|&index| FieldGetter { index })
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::students()
    }
}

impl FromStr for Schema {
    type Err = Error;

    /// Parses `name[:text|:int],...`; the first column is the primary key.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut columns = Vec::new();
        for part in text.split(',') {
            let part = part.trim();
            let (name, kind) = match part.split_once(':') {
                Some((name, "text")) => (name, ColumnKind::Text),
                Some((name, "int")) => (name, ColumnKind::Integer),
                Some((_, other)) => {
                    return Err(Error::new(ErrorKind::Usage)
                        .with_message(format!("unknown column type: {other}"))
                        .with_hint("Column types are `text` (default) and `int`."));
                }
                None => (part, ColumnKind::Text),
            };
            columns.push(Column {
                name: name.trim().to_string(),
                kind,
            });
        }
        Self::new(columns)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, column) in self.columns.iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", column.name)?;
            if column.kind == ColumnKind::Integer {
                write!(f, ":int")?;
            }
        }
        Ok(())
    }
}

fn registry(columns: &[Column]) -> Result<KeyedTable<String, usize>, Error> {
    let mut getters = KeyedTable::with_capacity(columns.len())?;
    for (index, column) in columns.iter().enumerate() {
        validate_name(&column.name)?;
        if getters.put(column.name.clone(), index)?.is_some() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("duplicate column name: {}", column.name)));
        }
    }
    Ok(getters)
}

fn validate_name(name: &str) -> Result<(), Error> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_');
    if !valid {
        return Err(Error::new(ErrorKind::Usage)
            .with_message(format!("invalid column name: {name:?}"))
            .with_hint("Column names start with a letter or '_' and contain only letters, digits and '_'."));
    }
    if name.eq_ignore_ascii_case("AND") || name == LIKE_KEYWORD {
        return Err(Error::new(ErrorKind::Usage)
            .with_message(format!("column name collides with a query keyword: {name}")));
    }
    Ok(())
}
