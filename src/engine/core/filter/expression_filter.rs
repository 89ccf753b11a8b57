use std::cmp::Ordering;

use roaring::RoaringBitmap;
use tracing::debug;

use crate::engine::core::column::MeasureCodec;
use crate::engine::core::dictionary::{DirectDictionaryGenerator, MEMBER_DEFAULT_SURROGATE};
use crate::engine::core::filter::{CompareOp, Expression, FilterExecutor, FilterRow};
use crate::engine::errors::{FilterError, ScanError};
use crate::engine::schema::{ColumnEncoding, ColumnRole, DataType, SegmentSchema, StorageColumn};
use crate::engine::types::{MEMBER_DEFAULT_VAL, Value, no_dictionary};
use crate::shared::config::DirectDictionaryConfig;

/// [`Expression`] bound to a segment schema.
///
/// Dimension literals are converted to the column's stored form once, so a
/// row test compares raw filter-slot contents: key bytes for no-dictionary
/// columns, surrogates for dictionary columns. Measures compare typed values.
#[derive(Debug, Clone)]
pub struct ExpressionFilter {
    root: Node,
    columns: Vec<String>,
    column_count: u32,
}

#[derive(Debug, Clone)]
struct BoundColumn {
    storage_idx: u32,
    role: ColumnRole,
    ordinal: usize,
    kind: SlotKind,
}

#[derive(Debug, Clone)]
enum SlotKind {
    /// Order-preserving no-dictionary key bytes
    Key { empty_is_null: bool },
    Direct(DirectDictionaryGenerator),
    Surrogate,
    /// Only null tests apply
    Complex,
    Measure(MeasureCodec),
}

#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Key(Vec<u8>),
    Typed(Value),
    /// Literal `NULL`; never equal to anything
    Null,
}

#[derive(Debug, Clone)]
enum Node {
    Compare {
        column: BoundColumn,
        op: CompareOp,
        literal: Literal,
    },
    In {
        column: BoundColumn,
        literals: Vec<Literal>,
    },
    IsNull(BoundColumn),
    IsNotNull(BoundColumn),
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Not(Box<Node>),
    True,
}

/// A filter-slot or bound value in comparable form.
enum Cell<'a> {
    Null,
    Key(&'a [u8]),
    Typed(Value),
}

impl ExpressionFilter {
    pub fn bind(
        expr: &Expression,
        schema: &SegmentSchema,
        direct: &DirectDictionaryConfig,
    ) -> Result<Self, ScanError> {
        let root = bind_node(expr, schema, direct)?;
        let columns = expr
            .fields()
            .iter()
            .filter_map(|f| schema.position(f))
            .filter_map(|idx| schema.column(idx))
            .map(|c| c.name.clone())
            .collect::<Vec<_>>();
        debug!(
            target: "segment_stream::filter",
            columns = ?columns,
            "Bound filter expression"
        );
        Ok(Self {
            root,
            columns,
            column_count: schema.len() as u32,
        })
    }
}

fn bind_node(
    expr: &Expression,
    schema: &SegmentSchema,
    direct: &DirectDictionaryConfig,
) -> Result<Node, ScanError> {
    Ok(match expr {
        Expression::Compare { field, op, value } => {
            let (column, def) = bind_column(field, schema, direct)?;
            if matches!(column.kind, SlotKind::Complex) {
                return Err(ScanError::InvalidFilter(format!(
                    "complex column '{}' supports only null tests",
                    def.name
                )));
            }
            let literal = bind_literal(&column, def, value)?;
            Node::Compare {
                column,
                op: *op,
                literal,
            }
        }
        Expression::In { field, values } => {
            let (column, def) = bind_column(field, schema, direct)?;
            if matches!(column.kind, SlotKind::Complex) {
                return Err(ScanError::InvalidFilter(format!(
                    "complex column '{}' supports only null tests",
                    def.name
                )));
            }
            let literals = values
                .iter()
                .map(|v| bind_literal(&column, def, v))
                .collect::<Result<Vec<_>, _>>()?;
            Node::In { column, literals }
        }
        Expression::IsNull(field) => Node::IsNull(bind_column(field, schema, direct)?.0),
        Expression::IsNotNull(field) => Node::IsNotNull(bind_column(field, schema, direct)?.0),
        Expression::And(l, r) => Node::And(
            Box::new(bind_node(l, schema, direct)?),
            Box::new(bind_node(r, schema, direct)?),
        ),
        Expression::Or(l, r) => Node::Or(
            Box::new(bind_node(l, schema, direct)?),
            Box::new(bind_node(r, schema, direct)?),
        ),
        Expression::Not(inner) => Node::Not(Box::new(bind_node(inner, schema, direct)?)),
        Expression::True => Node::True,
    })
}

fn bind_column<'s>(
    field: &str,
    schema: &'s SegmentSchema,
    direct: &DirectDictionaryConfig,
) -> Result<(BoundColumn, &'s StorageColumn), ScanError> {
    let idx = schema
        .position(field)
        .ok_or_else(|| ScanError::InvalidFilter(format!("unknown column '{}'", field)))?;
    let def = schema
        .column(idx)
        .ok_or_else(|| ScanError::InvalidFilter(format!("unknown column '{}'", field)))?;
    let kind = match def.encoding {
        ColumnEncoding::NoDictionary => SlotKind::Key {
            empty_is_null: !matches!(def.data_type, DataType::String | DataType::Binary),
        },
        ColumnEncoding::DirectDictionary => {
            SlotKind::Direct(DirectDictionaryGenerator::for_type(&def.data_type, direct)?)
        }
        ColumnEncoding::Dictionary => SlotKind::Surrogate,
        ColumnEncoding::Complex => SlotKind::Complex,
        ColumnEncoding::Plain => SlotKind::Measure(
            MeasureCodec::for_type(&def.data_type).ok_or_else(|| {
                ScanError::InvalidFilter(format!("'{}' is not a numeric measure", def.name))
            })?,
        ),
    };
    Ok((
        BoundColumn {
            storage_idx: idx as u32,
            role: def.role,
            ordinal: def.ordinal,
            kind,
        },
        def,
    ))
}

fn bind_literal(
    column: &BoundColumn,
    def: &StorageColumn,
    value: &Value,
) -> Result<Literal, ScanError> {
    if value.is_null() {
        return Ok(Literal::Null);
    }
    let mismatch = || {
        ScanError::InvalidFilter(format!(
            "literal {:?} does not fit column '{}' ({:?})",
            value, def.name, def.data_type
        ))
    };
    Ok(match &column.kind {
        SlotKind::Key { .. } => {
            Literal::Key(no_dictionary::encode(value, &def.data_type).ok_or_else(mismatch)?)
        }
        SlotKind::Direct(_) | SlotKind::Measure(_) => {
            Literal::Typed(value.coerce_to(&def.data_type).ok_or_else(mismatch)?)
        }
        // Dictionary columns are compared on surrogate keys.
        SlotKind::Surrogate => {
            Literal::Typed(value.coerce_to(&DataType::Int).ok_or_else(mismatch)?)
        }
        SlotKind::Complex => return Err(mismatch()),
    })
}

impl BoundColumn {
    fn slot(&self, dimension_ordinal_max: usize) -> usize {
        match self.role {
            ColumnRole::Dimension => self.ordinal,
            ColumnRole::Measure => dimension_ordinal_max + self.ordinal,
        }
    }

    /// Interprets a filter-slot value.
    fn row_cell<'a>(&self, slot: usize, value: &'a Value) -> Result<Cell<'a>, FilterError> {
        let unexpected = |expected: &'static str| FilterError::UnexpectedValue {
            slot,
            expected,
            found: value.type_name(),
        };
        match (&self.kind, value) {
            (_, Value::Null) => Ok(Cell::Null),
            (SlotKind::Complex, _) => Ok(Cell::Key(&[])),
            (SlotKind::Measure(_), v) => Ok(Cell::Typed(v.clone())),
            (kind, Value::Bytes(bytes)) => self
                .key_cell(kind, bytes)
                .ok_or_else(|| unexpected("bytes")),
            _ => Err(unexpected("bytes")),
        }
    }

    /// Interprets a min/max bound; `None` when the bound is unusable.
    fn bound_cell<'a>(&self, bytes: &'a [u8]) -> Option<Cell<'a>> {
        match &self.kind {
            SlotKind::Complex => None,
            SlotKind::Measure(codec) => codec.decode_bound(bytes).map(Cell::Typed),
            kind => self.key_cell(kind, bytes),
        }
    }

    fn key_cell<'a>(&self, kind: &SlotKind, bytes: &'a [u8]) -> Option<Cell<'a>> {
        if bytes == MEMBER_DEFAULT_VAL {
            return Some(Cell::Null);
        }
        match kind {
            SlotKind::Key { empty_is_null } => Some(if *empty_is_null && bytes.is_empty() {
                Cell::Null
            } else {
                Cell::Key(bytes)
            }),
            SlotKind::Direct(generator) => {
                let surrogate = i32::from_be_bytes(bytes.try_into().ok()?);
                Some(match generator.value_of(surrogate).ok()? {
                    Value::Null => Cell::Null,
                    v => Cell::Typed(v),
                })
            }
            SlotKind::Surrogate => {
                let surrogate = i32::from_be_bytes(bytes.try_into().ok()?);
                Some(if surrogate == MEMBER_DEFAULT_SURROGATE {
                    Cell::Null
                } else {
                    Cell::Typed(Value::Int(surrogate))
                })
            }
            SlotKind::Complex | SlotKind::Measure(_) => None,
        }
    }
}

impl Cell<'_> {
    fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// `None` for nulls and incomparable pairs.
    fn compare(&self, literal: &Literal) -> Option<Ordering> {
        match (self, literal) {
            (Cell::Key(a), Literal::Key(b)) => Some((*a).cmp(b.as_slice())),
            (Cell::Typed(a), Literal::Typed(b)) => a.compare(b),
            _ => None,
        }
    }

    fn matches_type(&self, literal: &Literal) -> bool {
        match (self, literal) {
            (Cell::Typed(a), Literal::Typed(b)) => {
                std::mem::discriminant(a) == std::mem::discriminant(b)
            }
            _ => true,
        }
    }
}

impl Node {
    fn evaluate(&self, row: &FilterRow, dim_max: usize) -> Result<bool, FilterError> {
        match self {
            Node::True => Ok(true),
            Node::And(l, r) => Ok(l.evaluate(row, dim_max)? && r.evaluate(row, dim_max)?),
            Node::Or(l, r) => Ok(l.evaluate(row, dim_max)? || r.evaluate(row, dim_max)?),
            Node::Not(inner) => Ok(!inner.evaluate(row, dim_max)?),
            Node::IsNull(column) => {
                let slot = column.slot(dim_max);
                Ok(column.row_cell(slot, row.get(slot)?)?.is_null())
            }
            Node::IsNotNull(column) => {
                let slot = column.slot(dim_max);
                Ok(!column.row_cell(slot, row.get(slot)?)?.is_null())
            }
            Node::Compare {
                column,
                op,
                literal,
            } => {
                let slot = column.slot(dim_max);
                let value = row.get(slot)?;
                let cell = column.row_cell(slot, value)?;
                check_type(&cell, literal, slot, value)?;
                Ok(cell.compare(literal).is_some_and(|ord| op.holds(ord)))
            }
            Node::In { column, literals } => {
                let slot = column.slot(dim_max);
                let value = row.get(slot)?;
                let cell = column.row_cell(slot, value)?;
                for literal in literals {
                    check_type(&cell, literal, slot, value)?;
                    if cell.compare(literal) == Some(Ordering::Equal) {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    /// Candidate columns for a blocklet with the given bounds.
    fn prune(&self, max: &[Vec<u8>], min: &[Vec<u8>], column_count: u32) -> RoaringBitmap {
        match self {
            Node::True => (0..column_count).collect(),
            Node::And(l, r) => {
                let left = l.prune(max, min, column_count);
                if left.is_empty() {
                    return left;
                }
                let right = r.prune(max, min, column_count);
                if right.is_empty() { right } else { left | right }
            }
            Node::Or(l, r) => l.prune(max, min, column_count) | r.prune(max, min, column_count),
            Node::Not(inner) => {
                let mut all = RoaringBitmap::new();
                inner.collect_columns(&mut all);
                if all.is_empty() {
                    all.insert_range(0..column_count);
                }
                all
            }
            Node::IsNull(column) | Node::IsNotNull(column) => single(column),
            Node::Compare {
                column,
                op,
                literal,
            } => match bounds(column, max, min) {
                Bounds::Unknown => single(column),
                Bounds::AllNull => RoaringBitmap::new(),
                Bounds::Range(lo, hi) => {
                    if range_admits(&lo, &hi, *op, literal) {
                        single(column)
                    } else {
                        RoaringBitmap::new()
                    }
                }
            },
            Node::In { column, literals } => match bounds(column, max, min) {
                Bounds::Unknown => single(column),
                Bounds::AllNull => RoaringBitmap::new(),
                Bounds::Range(lo, hi) => {
                    if literals
                        .iter()
                        .any(|l| range_admits(&lo, &hi, CompareOp::Eq, l))
                    {
                        single(column)
                    } else {
                        RoaringBitmap::new()
                    }
                }
            },
        }
    }

    fn collect_columns(&self, out: &mut RoaringBitmap) {
        match self {
            Node::True => {}
            Node::And(l, r) | Node::Or(l, r) => {
                l.collect_columns(out);
                r.collect_columns(out);
            }
            Node::Not(inner) => inner.collect_columns(out),
            Node::IsNull(c) | Node::IsNotNull(c) => {
                out.insert(c.storage_idx);
            }
            Node::Compare { column, .. } | Node::In { column, .. } => {
                out.insert(column.storage_idx);
            }
        }
    }
}

fn check_type(
    cell: &Cell<'_>,
    literal: &Literal,
    slot: usize,
    value: &Value,
) -> Result<(), FilterError> {
    if cell.matches_type(literal) {
        return Ok(());
    }
    let expected = match literal {
        Literal::Typed(v) => v.type_name(),
        Literal::Key(_) => "bytes",
        Literal::Null => "null",
    };
    Err(FilterError::UnexpectedValue {
        slot,
        expected,
        found: value.type_name(),
    })
}

fn single(column: &BoundColumn) -> RoaringBitmap {
    let mut bits = RoaringBitmap::new();
    bits.insert(column.storage_idx);
    bits
}

enum Bounds<'a> {
    Unknown,
    AllNull,
    Range(Cell<'a>, Cell<'a>),
}

fn bounds<'a>(column: &BoundColumn, max: &'a [Vec<u8>], min: &'a [Vec<u8>]) -> Bounds<'a> {
    let idx = column.storage_idx as usize;
    let (Some(lo), Some(hi)) = (min.get(idx), max.get(idx)) else {
        return Bounds::Unknown;
    };
    match (column.bound_cell(lo), column.bound_cell(hi)) {
        (Some(Cell::Null), Some(Cell::Null)) => Bounds::AllNull,
        (Some(Cell::Null), _) | (_, Some(Cell::Null)) => Bounds::Unknown,
        (Some(lo), Some(hi)) => Bounds::Range(lo, hi),
        _ => Bounds::Unknown,
    }
}

/// Whether some value in `[lo, hi]` could satisfy `op literal`. Anything
/// incomparable is admitted.
fn range_admits(lo: &Cell<'_>, hi: &Cell<'_>, op: CompareOp, literal: &Literal) -> bool {
    if matches!(literal, Literal::Null) {
        return false;
    }
    let (Some(lo_ord), Some(hi_ord)) = (lo.compare(literal), hi.compare(literal)) else {
        return true;
    };
    match op {
        CompareOp::Eq => lo_ord != Ordering::Greater && hi_ord != Ordering::Less,
        CompareOp::Neq => !(lo_ord == Ordering::Equal && hi_ord == Ordering::Equal),
        CompareOp::Lt => lo_ord == Ordering::Less,
        CompareOp::Lte => lo_ord != Ordering::Greater,
        CompareOp::Gt => hi_ord == Ordering::Greater,
        CompareOp::Gte => hi_ord != Ordering::Less,
    }
}

impl FilterExecutor for ExpressionFilter {
    fn referenced_columns(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn is_scan_required(&self, max_values: &[Vec<u8>], min_values: &[Vec<u8>]) -> RoaringBitmap {
        self.root.prune(max_values, min_values, self.column_count)
    }

    fn apply_filter(
        &self,
        row: &FilterRow,
        dimension_ordinal_max: usize,
    ) -> Result<bool, FilterError> {
        self.root.evaluate(row, dimension_ordinal_max)
    }
}
