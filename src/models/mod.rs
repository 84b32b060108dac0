// Copyright (c) 2025, ThumbStudio Contributors
// SPDX-License-Identifier: BSD-3-Clause

//! Core data model: colors, text layers, project state and templates.

pub mod color;
pub mod layer;
pub mod project;
