/*!
 * # mptpatch - Dragon Quest IV party chat patcher
 *
 * A Rust library that rewrites the English `.mpt` dialogue scripts of the
 * mobile release so they can be dropped into the Japanese DS rom.
 *
 * ## Features
 *
 * - Resolve embedded control blocks (plural, party member, gender variants)
 * - Gender-neutral, masculine, feminine or combined wording
 * - Optional hard-coded hero name
 * - Nametag or name-embedded speaker layout
 * - Greedy re-wrapping for the message window, with hand-tuned overrides
 * - Byte-exact file sizes: every patched file keeps its original length
 * - Rom extraction and repacking through ndstool
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `script`: The byte-level transformation engine:
 *   - `script::segmenter`: Segment scanning and file rebuilding
 *   - `script::decoder`: Control block parsing
 *   - `script::resolver`: Variant selection
 *   - `script::normalizer`: Glyph, grammar and hero-name fixups
 *   - `script::reflow`: Word wrapping
 *   - `script::overrides`: Special-case line and file rewrites
 * - `file_utils`: File system operations
 * - `rom_tools`: ndstool integration
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod rom_tools;
pub mod script;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunOptions, RunSummary};
pub use errors::{AppError, ConfigError, ScriptError, ToolError};
pub use script::{GenderMode, LocaleMode, ReflowConfig, ReflowTable, ResolutionPolicy, ScriptPatcher};
