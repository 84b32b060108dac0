// Copyright (c) 2025, ThumbStudio Contributors
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the ThumbStudio application.

pub mod canvas;
pub mod properties;
pub mod toolbar;
