// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

#[allow(unused_extern_crates)]
extern crate self as mcsync_controller;

pub mod controller;
pub mod crd;
pub mod document;
pub mod drift;
pub mod error;

#[cfg(test)]
mod test_support;
