//! Dialect-neutral descriptions of tables, columns and indexes.
//!
//! Migration bodies and the bootstrapper declare the shape they want with
//! these types; each [`DialectAdapter`](crate::DialectAdapter) renders them
//! into its own DDL.

use crate::value::Value;

/// Logical column types understood by every adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Auto-incrementing integer primary key.
    Serial,
    /// 64-bit integer.
    Integer,
    /// Double precision float.
    Real,
    /// Unbounded text.
    Text,
    /// Boolean (stored as 0/1 on the embedded dialect).
    Boolean,
    /// Timestamp with time zone semantics (UTC).
    Timestamp,
}

/// Default value expression of a column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDefault {
    /// Insertion time.
    CurrentTimestamp,
    /// A literal integer.
    Integer(i64),
    /// A literal string.
    Text(String),
    /// A literal boolean.
    Boolean(bool),
}

/// Foreign key target of a column.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    /// Referenced table.
    pub table: String,
    /// Referenced column.
    pub column: String,
    /// Whether deleting the referenced row cascades.
    pub on_delete_cascade: bool,
}

/// A column declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Logical type.
    pub ty: ColumnType,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Whether the column carries a single-column unique constraint.
    pub unique: bool,
    /// Default value, if any.
    pub default: Option<ColumnDefault>,
    /// Foreign key, if any.
    pub references: Option<ForeignKey>,
}

impl ColumnDef {
    /// A nullable column of the given type with no constraints.
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: true,
            unique: false,
            default: None,
            references: None,
        }
    }

    /// The auto-incrementing `id` primary key column.
    pub fn id() -> Self {
        Self::new("id", ColumnType::Serial).not_null()
    }

    /// Marks the column NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Adds a unique constraint.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the default value.
    pub fn default(mut self, default: ColumnDefault) -> Self {
        self.default = Some(default);
        self
    }

    /// Adds a foreign key to `table(column)`, cascading on delete.
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.references = Some(ForeignKey {
            table: table.into(),
            column: column.into(),
            on_delete_cascade: true,
        });
        self
    }

    /// True for the auto-incrementing primary key.
    pub fn is_primary_key(&self) -> bool {
        self.ty == ColumnType::Serial
    }
}

/// An index declaration. Always created with "if not exists" semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDef {
    /// Index name, unique per database.
    pub name: String,
    /// Indexed table.
    pub table: String,
    /// Indexed columns, in order.
    pub columns: Vec<String>,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
}

impl IndexDef {
    /// A non-unique index.
    pub fn new(name: impl Into<String>, table: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique: false,
        }
    }

    /// Makes the index unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// The full shape of a table: columns, composite unique keys and indexes.
///
/// This is what the embedded dialect rebuilds when it has to emulate an
/// `ALTER COLUMN`, so it must describe the table completely.
#[derive(Debug, Clone, PartialEq)]
pub struct TableShape {
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnDef>,
    /// Composite unique constraints.
    pub unique_together: Vec<Vec<String>>,
    /// Secondary indexes owned by the table.
    pub indexes: Vec<IndexDef>,
}

impl TableShape {
    /// An empty shape for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            unique_together: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Appends a column.
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends a composite unique constraint.
    pub fn unique_together(mut self, columns: &[&str]) -> Self {
        self.unique_together
            .push(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Appends an index on this table.
    pub fn index(mut self, name: impl Into<String>, columns: &[&str], unique: bool) -> Self {
        let mut index = IndexDef::new(name, self.name.clone(), columns);
        index.unique = unique;
        self.indexes.push(index);
        self
    }

    /// Looks up a column by name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A single column-level alteration.
///
/// The server dialect executes these directly. The embedded dialect rebuilds
/// the table with the target [`TableShape`] and uses the changes only to
/// decide how each copied column is transformed.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnChange {
    /// Remove a column.
    Drop {
        /// Column to remove.
        column: String,
    },
    /// Make a column NOT NULL, filling existing NULLs with `backfill` first.
    SetNotNull {
        /// Column to constrain.
        column: String,
        /// Value written into rows where the column is NULL.
        backfill: Option<Value>,
    },
    /// Allow NULL in a column.
    DropNotNull {
        /// Column to relax.
        column: String,
    },
    /// Change a column's type, converting existing values with a cast.
    ChangeType {
        /// Column to convert.
        column: String,
        /// New type.
        ty: ColumnType,
    },
}

/// A column as reported by the backend's catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// The backend's own type name, lower-cased.
    pub data_type: String,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Default expression as the backend renders it, `None` when absent.
    pub default: Option<String>,
}
