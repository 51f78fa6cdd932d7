// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Frame key: the textual record key shared with the training loaders.
//!
//! ```text
//! <sequence_id>_<frame_count>x<height>x<width>_<frame_index:04>
//! e.g. 00042_0571_100x432x768_0007
//! ```
//!
//! `sequence_id` may itself contain `_`; parsing treats the last two
//! `_`-separated fields as size and index and re-joins the rest.

use std::fmt;
use std::str::FromStr;

use crate::error::{FrameDbError, Result};
use crate::frame;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameKey {
    pub sequence_id: String,
    pub frame_count: usize,
    pub height: u32,
    pub width: u32,
    pub frame_index: usize,
}

impl FrameKey {
    /// Build a key, rejecting sequence ids that cannot round-trip through
    /// the ASCII key grammar.
    pub fn new(
        sequence_id: &str,
        frame_count: usize,
        height: u32,
        width: u32,
        frame_index: usize,
    ) -> Result<Self> {
        if sequence_id.is_empty() || !sequence_id.is_ascii() {
            return Err(invalid(sequence_id, "sequence id must be non-empty ASCII"));
        }
        Ok(Self {
            sequence_id: sequence_id.to_string(),
            frame_count,
            height,
            width,
            frame_index,
        })
    }

    /// Value length implied by the encoded dimensions.
    pub fn expected_len(&self) -> usize {
        frame::byte_len(self.height, self.width)
    }
}

impl fmt::Display for FrameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}x{}x{}_{:04}",
            self.sequence_id, self.frame_count, self.height, self.width, self.frame_index
        )
    }
}

impl FromStr for FrameKey {
    type Err = FrameDbError;

    fn from_str(key: &str) -> Result<Self> {
        let mut parts = key.rsplitn(3, '_');
        let (Some(index), Some(size), Some(sequence_id)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid(key, "expected <seq>_<N>x<H>x<W>_<idx>"));
        };
        if sequence_id.is_empty() {
            return Err(invalid(key, "empty sequence id"));
        }

        let dims: Vec<&str> = size.split('x').collect();
        let [count, height, width] = dims.as_slice() else {
            return Err(invalid(key, "size field must be <N>x<H>x<W>"));
        };

        Ok(Self {
            sequence_id: sequence_id.to_string(),
            frame_count: number(key, count)?,
            height: number(key, height)?,
            width: number(key, width)?,
            frame_index: number(key, index)?,
        })
    }
}

fn number<T: FromStr>(key: &str, field: &str) -> Result<T> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(key, &format!("'{field}' is not a decimal number")));
    }
    field
        .parse()
        .map_err(|_| invalid(key, &format!("'{field}' is out of range")))
}

fn invalid(key: &str, reason: &str) -> FrameDbError {
    FrameDbError::InvalidKey { key: key.to_string(), reason: reason.to_string() }
}
