//! This module defines the canonical, type-safe representation of the wire type
//! tag assigned to every column of a tabwire table.

use crate::error::TabwireError;
use arrow::datatypes::{DataType as ArrowDataType, Field};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The closed set of transport types. Exactly one is assigned to each column per
/// serialization pass.
///
/// The discriminants are the stable wire ids written into every envelope.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum SimpleType {
    Boolean = 1,
    BooleanList = 2,
    BooleanSet = 3,
    Integer = 4,
    IntegerList = 5,
    IntegerSet = 6,
    Long = 7,
    LongList = 8,
    LongSet = 9,
    Double = 10,
    DoubleList = 11,
    DoubleSet = 12,
    String = 13,
    StringList = 14,
    StringSet = 15,
    Bytes = 16,
    BytesList = 17,
    BytesSet = 18,
}

impl SimpleType {
    /// Every tag, in wire-id order.
    pub const ALL: [SimpleType; 18] = [
        Self::Boolean,
        Self::BooleanList,
        Self::BooleanSet,
        Self::Integer,
        Self::IntegerList,
        Self::IntegerSet,
        Self::Long,
        Self::LongList,
        Self::LongSet,
        Self::Double,
        Self::DoubleList,
        Self::DoubleSet,
        Self::String,
        Self::StringList,
        Self::StringSet,
        Self::Bytes,
        Self::BytesList,
        Self::BytesSet,
    ];

    /// The stable wire id of this tag.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Looks up a tag by its wire id.
    pub fn from_id(id: u8) -> Result<Self, TabwireError> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.id() == id)
            .ok_or_else(|| TabwireError::FrameFormatError(format!("Unknown simple type id {}", id)))
    }

    /// The scalar tag underlying a list or set tag; scalars map to themselves.
    pub fn element_type(self) -> Self {
        use SimpleType::*;
        match self {
            Boolean | BooleanList | BooleanSet => Boolean,
            Integer | IntegerList | IntegerSet => Integer,
            Long | LongList | LongSet => Long,
            Double | DoubleList | DoubleSet => Double,
            String | StringList | StringSet => String,
            Bytes | BytesList | BytesSet => Bytes,
        }
    }

    /// The list variant of this tag's element type.
    pub fn list_of(self) -> Self {
        use SimpleType::*;
        match self.element_type() {
            Boolean => BooleanList,
            Integer => IntegerList,
            Long => LongList,
            Double => DoubleList,
            String => StringList,
            _ => BytesList,
        }
    }

    /// The set variant of this tag's element type.
    pub fn set_of(self) -> Self {
        use SimpleType::*;
        match self.element_type() {
            Boolean => BooleanSet,
            Integer => IntegerSet,
            Long => LongSet,
            Double => DoubleSet,
            String => StringSet,
            _ => BytesSet,
        }
    }

    pub fn is_list(self) -> bool {
        use SimpleType::*;
        matches!(
            self,
            BooleanList | IntegerList | LongList | DoubleList | StringList | BytesList
        )
    }

    pub fn is_set(self) -> bool {
        use SimpleType::*;
        matches!(
            self,
            BooleanSet | IntegerSet | LongSet | DoubleSet | StringSet | BytesSet
        )
    }

    pub fn is_collection(self) -> bool {
        self.is_list() || self.is_set()
    }

    /// Returns `true` for `BYTES` and its list/set variants, the only tags that may
    /// carry a codec id.
    pub fn is_codec_backed(self) -> bool {
        self.element_type() == SimpleType::Bytes
    }

    /// The Arrow type used by the reference transport for this tag.
    ///
    /// Sets share the list layout; the tag itself travels in field metadata.
    pub fn to_arrow_type(self) -> ArrowDataType {
        let scalar = match self.element_type() {
            SimpleType::Boolean => ArrowDataType::Boolean,
            SimpleType::Integer => ArrowDataType::Int32,
            SimpleType::Long => ArrowDataType::Int64,
            SimpleType::Double => ArrowDataType::Float64,
            SimpleType::String => ArrowDataType::Utf8,
            _ => ArrowDataType::Binary,
        };
        if self.is_collection() {
            ArrowDataType::List(Arc::new(Field::new("item", scalar, true)))
        } else {
            scalar
        }
    }

    fn wire_name(self) -> &'static str {
        use SimpleType::*;
        match self {
            Boolean => "BOOLEAN",
            BooleanList => "BOOLEAN_LIST",
            BooleanSet => "BOOLEAN_SET",
            Integer => "INTEGER",
            IntegerList => "INTEGER_LIST",
            IntegerSet => "INTEGER_SET",
            Long => "LONG",
            LongList => "LONG_LIST",
            LongSet => "LONG_SET",
            Double => "DOUBLE",
            DoubleList => "DOUBLE_LIST",
            DoubleSet => "DOUBLE_SET",
            String => "STRING",
            StringList => "STRING_LIST",
            StringSet => "STRING_SET",
            Bytes => "BYTES",
            BytesList => "BYTES_LIST",
            BytesSet => "BYTES_SET",
        }
    }
}

/// Provides the canonical string representation for a `SimpleType`.
impl fmt::Display for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Part of the public contract: matches the serde representation.
        f.write_str(self.wire_name())
    }
}
