use std::fmt;

/// A fully qualified table identity.
///
/// MySQL calls the first component the schema in `information_schema` and the
/// database everywhere else; both refer to the same namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName {
    /// The database (schema) containing the table.
    pub schema: String,
    /// The name of the table within the database.
    pub name: String,
}

impl TableName {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> TableName {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{0}.{1}", self.schema, self.name))
    }
}

/// One table's shape as reported by the metadata source.
///
/// The column order is significant: it must match the physical column order the
/// transport reports row values in, since enrichment zips the two positionally.
/// Instances are immutable once cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// The table this schema describes.
    pub name: TableName,
    /// Ordered column names.
    pub column_names: Vec<String>,
}

impl TableSchema {
    pub fn new(name: TableName, column_names: Vec<String>) -> TableSchema {
        Self { name, column_names }
    }

    /// Returns the number of columns in the table.
    pub fn column_count(&self) -> usize {
        self.column_names.len()
    }
}
