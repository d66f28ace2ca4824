//! Fixed-size, little-endian wire types for boundary exchanges.

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;
use std::mem::size_of;

use crate::iolet_error::IoletError;

pub fn cast_slice<T: Pod>(v: &[T]) -> &[u8] {
    bytemuck::cast_slice(v)
}

pub fn expect_exact_len(actual: usize, expected: usize) -> Result<(), IoletError> {
    if actual == expected {
        Ok(())
    } else {
        Err(IoletError::Wire(format!(
            "expected {expected} bytes, got {actual}"
        )))
    }
}

/// Decode exactly one `T` from a received buffer.
///
/// Copies into an aligned value; received `Vec<u8>`s carry no alignment
/// guarantee for `T`.
pub fn decode_one<T: Pod>(bytes: &[u8]) -> Result<T, IoletError> {
    expect_exact_len(bytes.len(), size_of::<T>())?;
    Ok(bytemuck::pod_read_unaligned(bytes))
}

/// All multi-byte integers in these structs are **little-endian** on the wire.
/// We store them pre-LE with `.to_le()` and decode with `.from_le()`.

/// One rank's "I own this iolet" flag in a membership gather.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WireFlag {
    pub flag_le: u32,
}

impl WireFlag {
    pub fn new(flag: bool) -> Self {
        Self {
            flag_le: (flag as u32).to_le(),
        }
    }
    pub fn get(&self) -> bool {
        u32::from_le(self.flag_le) != 0
    }
}

/// A boundary density for one timestep, sent by the coordinator.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WireDensity {
    pub step_le: u64,
    pub density_bits_le: u64,
}

impl WireDensity {
    pub fn new(step: u64, density: f64) -> Self {
        Self {
            step_le: step.to_le(),
            density_bits_le: density.to_bits().to_le(),
        }
    }
    pub fn step(&self) -> u64 {
        u64::from_le(self.step_le)
    }
    pub fn density(&self) -> f64 {
        f64::from_bits(u64::from_le(self.density_bits_le))
    }
}

const_assert_eq!(size_of::<WireFlag>(), 4);
const_assert_eq!(size_of::<WireDensity>(), 16);
