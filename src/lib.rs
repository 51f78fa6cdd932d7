// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

pub mod builder;
pub mod config;
pub mod dataset;
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod scan;
pub mod storage;
pub mod verifier;
