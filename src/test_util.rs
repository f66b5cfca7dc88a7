//! Shared fixtures for unit tests: a small extension type and its codec.

use crate::codec::{Codec, InMemoryCodecRegistry};
use crate::error::TabwireError;
use crate::types::{Cell, ExtensionObject};
use std::any::Any;
use std::sync::Arc;

pub(crate) const POINT_TYPE: &str = "custom.Point";
pub(crate) const POINT_CODEC: &str = "custom.point";

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Point {
    pub x: i32,
    pub y: i32,
}

impl ExtensionObject for Point {
    fn type_name(&self) -> &str {
        POINT_TYPE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn ExtensionObject) -> bool {
        other.as_any().downcast_ref::<Point>() == Some(self)
    }
}

pub(crate) fn point(x: i32, y: i32) -> Cell {
    Cell::extension(Point { x, y })
}

/// Encodes a point as the UTF-8 text `"x,y"`.
pub(crate) struct PointCodec;

impl Codec for PointCodec {
    fn serialize(&self, value: &Cell) -> Result<Vec<u8>, TabwireError> {
        match value {
            Cell::Extension(ext) => {
                let p = ext.downcast_ref::<Point>().ok_or_else(|| TabwireError::Codec {
                    codec_id: POINT_CODEC.into(),
                    message: format!("not a point: {}", ext.type_name()),
                })?;
                Ok(format!("{},{}", p.x, p.y).into_bytes())
            }
            other => Err(TabwireError::Codec {
                codec_id: POINT_CODEC.into(),
                message: format!("not a point: {}", other),
            }),
        }
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Cell, TabwireError> {
        let bad = || TabwireError::Codec {
            codec_id: POINT_CODEC.into(),
            message: format!("malformed point payload {:?}", bytes),
        };
        let text = std::str::from_utf8(bytes).map_err(|_| bad())?;
        let (x, y) = text.split_once(',').ok_or_else(bad)?;
        Ok(point(
            x.parse().map_err(|_| bad())?,
            y.parse().map_err(|_| bad())?,
        ))
    }
}

pub(crate) fn point_registry() -> InMemoryCodecRegistry {
    let mut registry = InMemoryCodecRegistry::new();
    registry.register(POINT_CODEC, POINT_TYPE, Arc::new(PointCodec));
    registry
}
