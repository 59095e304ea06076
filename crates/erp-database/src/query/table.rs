//! Static table descriptors used to resolve field paths.
//!
//! Field paths coming from callers are only ever matched against these
//! descriptors; the SQL identifiers written into a statement always come
//! from here, never from the caller.

/// SQL type of a column, used to coerce filter values and to render the
/// zero value of columns left out of a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// `TEXT`
    Text,
    /// `BIGINT`
    BigInt,
    /// `INTEGER`
    Int,
    /// `DOUBLE PRECISION`
    Float,
    /// `BOOLEAN`
    Bool,
    /// `TIMESTAMPTZ`
    Timestamp,
}

impl ColumnKind {
    /// SQL type name for casts.
    pub fn sql_type(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::BigInt => "bigint",
            Self::Int => "integer",
            Self::Float => "double precision",
            Self::Bool => "boolean",
            Self::Timestamp => "timestamptz",
        }
    }

    /// Literal used for a column that was not projected.
    pub fn zero_literal(&self) -> &'static str {
        match self {
            Self::Text => "''",
            Self::BigInt | Self::Int | Self::Float => "0",
            Self::Bool => "FALSE",
            Self::Timestamp => "'epoch'",
        }
    }
}

/// A column of a table.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    /// Column name.
    pub name: &'static str,
    /// Column type.
    pub kind: ColumnKind,
    /// Whether the column accepts `NULL`.
    pub nullable: bool,
}

impl Column {
    /// A `NOT NULL` column.
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    /// A nullable column.
    pub const fn nullable(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: true,
        }
    }

    /// Expression selected in place of this column when it is not projected.
    pub fn zero_expr(&self) -> String {
        if self.nullable {
            format!("NULL::{}", self.kind.sql_type())
        } else {
            format!("{}::{}", self.kind.zero_literal(), self.kind.sql_type())
        }
    }
}

/// A many-to-one relation reachable through a foreign key column.
#[derive(Debug, Clone, Copy)]
pub struct Relation {
    /// Name used in field paths (`attribute` in `attribute.name`).
    pub name: &'static str,
    /// Foreign key column on the owning table.
    pub local_column: &'static str,
    /// Referenced table.
    pub target: &'static Table,
    /// Referenced column on the target table.
    pub target_column: &'static str,
}

/// A table that list queries can target or join.
#[derive(Debug)]
pub struct Table {
    /// Table name.
    pub name: &'static str,
    /// Alias used when the table is the root of a query.
    pub alias: &'static str,
    /// All columns, in `SELECT` order.
    pub columns: &'static [Column],
    /// Relations that field paths may traverse.
    pub relations: &'static [Relation],
}

impl Table {
    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a relation by name.
    pub fn relation(&self, name: &str) -> Option<&'static Relation> {
        self.relations.iter().find(|r| r.name == name)
    }
}

const AUDIT_COLUMNS: [Column; 4] = [
    Column::nullable("create_user_id", ColumnKind::BigInt),
    Column::nullable("update_user_id", ColumnKind::BigInt),
    Column::new("created_at", ColumnKind::Timestamp),
    Column::new("updated_at", ColumnKind::Timestamp),
];

/// `sequences`
pub static SEQUENCES: Table = Table {
    name: "sequences",
    alias: "seq",
    columns: &[
        Column::new("id", ColumnKind::BigInt),
        AUDIT_COLUMNS[0],
        AUDIT_COLUMNS[1],
        AUDIT_COLUMNS[2],
        AUDIT_COLUMNS[3],
        Column::new("name", ColumnKind::Text),
        Column::new("prefix", ColumnKind::Text),
        Column::new("current", ColumnKind::BigInt),
        Column::new("padding", ColumnKind::BigInt),
        Column::new("struct_name", ColumnKind::Text),
        Column::new("active", ColumnKind::Bool),
        Column::new("is_default", ColumnKind::Bool),
    ],
    relations: &[],
};

/// `product_attributes`
pub static PRODUCT_ATTRIBUTES: Table = Table {
    name: "product_attributes",
    alias: "pa",
    columns: &[
        Column::new("id", ColumnKind::BigInt),
        AUDIT_COLUMNS[0],
        AUDIT_COLUMNS[1],
        AUDIT_COLUMNS[2],
        AUDIT_COLUMNS[3],
        Column::new("name", ColumnKind::Text),
        Column::new("sequence", ColumnKind::Int),
    ],
    relations: &[],
};

/// `product_attribute_values`
pub static PRODUCT_ATTRIBUTE_VALUES: Table = Table {
    name: "product_attribute_values",
    alias: "pav",
    columns: &[
        Column::new("id", ColumnKind::BigInt),
        AUDIT_COLUMNS[0],
        AUDIT_COLUMNS[1],
        AUDIT_COLUMNS[2],
        AUDIT_COLUMNS[3],
        Column::new("name", ColumnKind::Text),
        Column::new("attribute_id", ColumnKind::BigInt),
        Column::new("price_extra", ColumnKind::Float),
        Column::new("sequence", ColumnKind::Int),
    ],
    relations: &[Relation {
        name: "attribute",
        local_column: "attribute_id",
        target: &PRODUCT_ATTRIBUTES,
        target_column: "id",
    }],
};
