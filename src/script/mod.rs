/*!
 * Script transformation engine for `.mpt` message files.
 *
 * Every stage works on owned byte buffers and is a pure function of its
 * input and the run's [`ResolutionPolicy`]:
 * - `segmenter`: splits a file into segments and rebuilds it
 * - `decoder`: parses nested control blocks
 * - `resolver`: picks one variant per block
 * - `normalizer`: glyph, grammar and hero-name fixups
 * - `reflow`: greedy word wrap per file profile
 * - `overrides`: hand-authored line and whole-file fixes
 * - `segment`: the per-segment pipeline and length enforcement
 */

pub mod decoder;
pub mod markers;
pub mod normalizer;
pub mod overrides;
pub mod policy;
pub mod reflow;
pub mod resolver;
pub mod segment;
pub mod segmenter;

pub use decoder::{decode_block, decode_segment, ControlBlock, Decoded};
pub use markers::{ControlCode, Terminator};
pub use policy::{GenderMode, LocaleMode, ResolutionPolicy};
pub use reflow::{reflow, ReflowConfig, ReflowTable};
pub use resolver::{resolve, VariantChoice};
pub use segment::{enforce_length, process_segment};
pub use segmenter::{ScriptPatcher, Segment};
