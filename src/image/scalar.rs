//! Scalar element types a buffer can hold.
//!
//! Every pixel routine is written once, generic over [`Scalar`], and
//! instantiated for the supported set. [`ScalarKind`] is the runtime tag used
//! wherever the element type is only known dynamically (container headers,
//! the dispatch registry and the C ABI).
use std::fmt;

use byteorder::{ByteOrder, LittleEndian};
use half::f16;
use serde::{Deserialize, Serialize};

/// Runtime tag for a scalar element type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum ScalarKind {
    Uint8 = 0,
    Int8 = 1,
    Uint16 = 2,
    Int16 = 3,
    Uint32 = 4,
    Int32 = 5,
    Float16 = 6,
    Float32 = 7,
    Float64 = 8,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 9] = [
        Self::Uint8,
        Self::Int8,
        Self::Uint16,
        Self::Int16,
        Self::Uint32,
        Self::Int32,
        Self::Float16,
        Self::Float32,
        Self::Float64,
    ];

    /// Size of one element in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::Uint8 | Self::Int8 => 1,
            Self::Uint16 | Self::Int16 | Self::Float16 => 2,
            Self::Uint32 | Self::Int32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Uint8 => "uint8",
            Self::Int8 => "int8",
            Self::Uint16 => "uint16",
            Self::Int16 => "int16",
            Self::Uint32 => "uint32",
            Self::Int32 => "int32",
            Self::Float16 => "float16",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Struct-module style format character used by buffer views.
    pub const fn format(self) -> &'static str {
        match self {
            Self::Uint8 => "B",
            Self::Int8 => "b",
            Self::Uint16 => "H",
            Self::Int16 => "h",
            Self::Uint32 => "I",
            Self::Int32 => "i",
            Self::Float16 => "e",
            Self::Float32 => "f",
            Self::Float64 => "d",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|k| *k as u32 == code)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Element type of an [`Image`](super::Image).
///
/// `from_f64` follows `as` cast semantics: integers truncate toward zero and
/// saturate at their bounds, NaN maps to zero.
pub trait Scalar:
    Copy + Default + PartialEq + PartialOrd + fmt::Debug + Send + Sync + 'static
{
    const KIND: ScalarKind;

    fn to_f64(self) -> f64;
    fn from_f64(v: f64) -> Self;

    /// Nearest half-precision value (ties to even, overflow to ±inf).
    #[inline]
    fn to_f16(self) -> f16 {
        f16::from_f64(self.to_f64())
    }

    #[inline]
    fn from_f16(v: f16) -> Self {
        Self::from_f64(f16::to_f64(v))
    }

    /// Encode into `buf`, which holds exactly `KIND.size()` bytes.
    fn write_le(self, buf: &mut [u8]);

    /// Decode one element; `bytes` holds exactly `KIND.size()` bytes.
    fn read_le(bytes: &[u8]) -> Self;
}

fn read_u8(bytes: &[u8]) -> u8 {
    bytes[0]
}

fn write_u8(buf: &mut [u8], v: u8) {
    buf[0] = v;
}

fn read_i8(bytes: &[u8]) -> i8 {
    bytes[0] as i8
}

fn write_i8(buf: &mut [u8], v: i8) {
    buf[0] = v as u8;
}

macro_rules! impl_scalar {
    ($t:ty, $kind:ident, $read:path, $write:path) => {
        impl Scalar for $t {
            const KIND: ScalarKind = ScalarKind::$kind;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }
            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }
            #[inline]
            fn write_le(self, buf: &mut [u8]) {
                $write(buf, self)
            }
            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                $read(bytes)
            }
        }
    };
}

impl_scalar!(u8, Uint8, read_u8, write_u8);
impl_scalar!(i8, Int8, read_i8, write_i8);
impl_scalar!(u16, Uint16, LittleEndian::read_u16, LittleEndian::write_u16);
impl_scalar!(i16, Int16, LittleEndian::read_i16, LittleEndian::write_i16);
impl_scalar!(u32, Uint32, LittleEndian::read_u32, LittleEndian::write_u32);
impl_scalar!(i32, Int32, LittleEndian::read_i32, LittleEndian::write_i32);
impl_scalar!(f32, Float32, LittleEndian::read_f32, LittleEndian::write_f32);
impl_scalar!(f64, Float64, LittleEndian::read_f64, LittleEndian::write_f64);

impl Scalar for f16 {
    const KIND: ScalarKind = ScalarKind::Float16;

    #[inline]
    fn to_f64(self) -> f64 {
        f16::to_f64(self)
    }
    #[inline]
    fn from_f64(v: f64) -> Self {
        f16::from_f64(v)
    }
    #[inline]
    fn to_f16(self) -> f16 {
        self
    }
    #[inline]
    fn from_f16(v: f16) -> Self {
        v
    }
    #[inline]
    fn write_le(self, buf: &mut [u8]) {
        LittleEndian::write_u16(buf, self.to_bits());
    }
    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        f16::from_bits(LittleEndian::read_u16(bytes))
    }
}
