// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Build script for the thermo-rx receiver firmware
//!
//! Only the `rp2350` firmware build needs linker plumbing. Host builds of the
//! library (unit tests, simulators) skip it entirely so they never pick up the
//! RP2350 memory layout.
//!
//! # Memory Layout
//! The `memory.x` file defines the RP2350's memory regions:
//! - **FLASH**: 4MB starting at 0x10000000 (program code storage)
//! - **RAM**: 512KB starting at 0x20000000 (runtime data)
//! - **SRAM8**: 4KB starting at 0x20080000 (dedicated memory bank 8)
//! - **SRAM9**: 4KB starting at 0x20081000 (dedicated memory bank 9)
//!
//! # Linker Integration
//! `cortex-m-rt` picks the layout up through the `-Tlink.x` linker argument
//! specified in `.cargo/config.toml`.

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// Main build script entry point
///
/// # Process Flow
/// 1. Bails out unless the `rp2350` feature is enabled
/// 2. Copies `memory.x` to `OUT_DIR` so the linker can find it
/// 3. Adds `OUT_DIR` to the linker search path
///
/// # Panics
/// Panics if `OUT_DIR` is unset or `memory.x` cannot be written there.
fn main() {
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    if env::var_os("CARGO_FEATURE_RP2350").is_none() {
        return;
    }

    let out = &PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo"));

    File::create(out.join("memory.x"))
        .and_then(|mut file| file.write_all(include_bytes!("memory.x")))
        .expect("failed to write memory.x to OUT_DIR");

    println!("cargo:rustc-link-search={}", out.display());
}
