/*!
 * Per-segment pipeline: decode, normalize, reflow, override, pad.
 */

use log::debug;

use crate::errors::ScriptError;
use crate::script::decoder::decode_segment;
use crate::script::markers::{preview, SEGMENT_FILLER};
use crate::script::normalizer::normalize;
use crate::script::overrides::apply_line_overrides;
use crate::script::policy::ResolutionPolicy;
use crate::script::reflow::ReflowConfig;

/// Transform one segment interior, keeping its exact length
pub fn process_segment(
    file_id: &str,
    segment: &[u8],
    policy: &ResolutionPolicy,
    reflow: &ReflowConfig,
) -> Result<Vec<u8>, ScriptError> {
    let decoded = decode_segment(segment, policy)?;
    let normalized = normalize(&decoded, file_id, policy);
    let reflowed = reflow.apply(&normalized);
    let processed = apply_line_overrides(reflowed);

    debug!("Processed segment: {}", preview(&processed));
    enforce_length(processed, segment.len())
}

/// Pad `buffer` with spaces up to `original_len`
///
/// # Returns
/// * `Ok(Vec<u8>)` - The buffer, exactly `original_len` bytes long
/// * `Err(ScriptError::SegmentOverflow)` - The buffer was already longer
pub fn enforce_length(mut buffer: Vec<u8>, original_len: usize) -> Result<Vec<u8>, ScriptError> {
    if buffer.len() > original_len {
        return Err(ScriptError::SegmentOverflow {
            produced: buffer.len(),
            original: original_len,
            text: preview(&buffer),
        });
    }

    buffer.resize(original_len, SEGMENT_FILLER);
    Ok(buffer)
}
