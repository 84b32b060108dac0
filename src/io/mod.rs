// Copyright (c) 2025, ThumbStudio Contributors
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for media, project and template files.

pub mod media;
pub mod serialization;
