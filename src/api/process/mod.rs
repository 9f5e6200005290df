// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process API endpoint module
//!
//! Provides POST /v1/process for transforming an uploaded image.

pub mod handler;
pub mod response;

pub use handler::process_handler;
pub use response::ProcessResponse;
