// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

pub mod context;
pub mod lookup;
pub mod protection;
pub mod types;
pub mod utils;
