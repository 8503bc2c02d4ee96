/*!
 * Splits a script file into dialogue segments and rebuilds it.
 *
 * Bytes between segments are copied verbatim. Each segment's tag header is
 * re-emitted according to the locale mode, its interior goes through the
 * per-segment pipeline, and its terminator is copied unchanged. The rebuilt
 * file always has exactly the input's length.
 */

use log::{debug, info};

use crate::errors::ScriptError;
use crate::script::markers::{
    find_bytes, preview, Terminator, NAMETAG_END, NAME_EMBED_SEPARATOR, SEGMENT_START,
    TERMINATOR_LEN,
};
use crate::script::overrides::whole_file_override;
use crate::script::policy::{LocaleMode, ResolutionPolicy};
use crate::script::reflow::ReflowTable;
use crate::script::segment::process_segment;

/// One dialogue segment located in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Offset of the segment start marker
    pub start: usize,
    /// Speaker name between the start and nametag-end markers
    pub nametag: &'a [u8],
    /// Text between the nametag-end marker and the terminator
    pub interior: &'a [u8],
    /// Terminator that closed the segment
    pub terminator: Terminator,
    /// Offset just past the terminator
    pub end: usize,
}

impl Segment<'_> {
    /// Whether the nametag moves into the text under `mode`
    pub fn embeds_name(&self, mode: LocaleMode) -> bool {
        mode == LocaleMode::NameEmbedded && !self.nametag.is_empty() && !self.interior.is_empty()
    }

    /// Text handed to the pipeline: `Name*text` with the last byte dropped
    /// when the name is embedded, the interior otherwise
    pub fn pipeline_input(&self, mode: LocaleMode) -> Vec<u8> {
        if !self.embeds_name(mode) {
            return self.interior.to_vec();
        }

        let mut composed = Vec::with_capacity(self.nametag.len() + self.interior.len());
        composed.extend_from_slice(self.nametag);
        composed.push(NAME_EMBED_SEPARATOR);
        composed.extend_from_slice(&self.interior[..self.interior.len() - 1]);
        composed
    }
}

/// Find the next segment at or after `from`
pub fn find_segment(data: &[u8], from: usize) -> Result<Option<Segment<'_>>, ScriptError> {
    let Some(start) = find_bytes(&data[from..], SEGMENT_START).map(|pos| from + pos) else {
        return Ok(None);
    };

    let nametag_start = start + SEGMENT_START.len();
    let nametag_len = find_bytes(&data[nametag_start..], NAMETAG_END)
        .ok_or(ScriptError::UnterminatedNametag { offset: start })?;
    let interior_start = nametag_start + nametag_len + NAMETAG_END.len();

    let (interior_len, terminator) = (interior_start..data.len())
        .find_map(|pos| Terminator::from_bytes(&data[pos..]).map(|t| (pos - interior_start, t)))
        .ok_or(ScriptError::UnterminatedSegment {
            offset: interior_start,
        })?;

    Ok(Some(Segment {
        start,
        nametag: &data[nametag_start..nametag_start + nametag_len],
        interior: &data[interior_start..interior_start + interior_len],
        terminator,
        end: interior_start + interior_len + TERMINATOR_LEN,
    }))
}

/// Every segment in `data`, in file order
pub fn segments(data: &[u8]) -> Result<Vec<Segment<'_>>, ScriptError> {
    let mut found = Vec::new();
    let mut pointer = 0;
    while let Some(segment) = find_segment(data, pointer)? {
        pointer = segment.end;
        found.push(segment);
    }
    Ok(found)
}

/// Applies the full transformation to script files
#[derive(Debug, Clone, Default)]
pub struct ScriptPatcher {
    policy: ResolutionPolicy,
    reflow: ReflowTable,
}

impl ScriptPatcher {
    /// Create a patcher for one run
    pub fn new(policy: ResolutionPolicy, reflow: ReflowTable) -> Self {
        Self { policy, reflow }
    }

    pub fn policy(&self) -> &ResolutionPolicy {
        &self.policy
    }

    pub fn reflow(&self) -> &ReflowTable {
        &self.reflow
    }

    /// Patch a whole file, applying its whole-file override if it has one
    ///
    /// # Arguments
    /// * `file_id` - File name, e.g. `b0200000.mpt`
    /// * `data` - Raw file contents
    ///
    /// # Returns
    /// * `Result<Vec<u8>, ScriptError>` - Patched contents, same length as `data`
    pub fn patch_file(&self, file_id: &str, data: &[u8]) -> Result<Vec<u8>, ScriptError> {
        info!("Patching file {}", file_id);
        info!("Size: {} bytes", data.len());

        let patched = match whole_file_override(file_id, data) {
            Some(patched) => {
                info!("Applied special case patch to {}", file_id);
                patched
            }
            None => self.patch_stream(file_id, data)?,
        };

        check_file_length(file_id, &patched, data.len())?;
        info!("Successfully patched file {}", file_id);
        Ok(patched)
    }

    /// Rebuild `data` segment by segment
    pub fn patch_stream(&self, file_id: &str, data: &[u8]) -> Result<Vec<u8>, ScriptError> {
        let reflow = self.reflow.for_file(file_id);
        let mode = self.policy.locale_mode();
        let mut output = Vec::with_capacity(data.len());
        let mut pointer = 0;

        while let Some(segment) = find_segment(data, pointer)? {
            output.extend_from_slice(&data[pointer..segment.start]);

            output.extend_from_slice(SEGMENT_START);
            if !segment.embeds_name(mode) {
                output.extend_from_slice(segment.nametag);
            }
            output.extend_from_slice(NAMETAG_END);

            let input = segment.pipeline_input(mode);
            if segment.nametag.is_empty() {
                debug!("Processing segment ({} bytes): {}", input.len(), preview(&input));
            } else {
                debug!(
                    "Processing segment ({} bytes): [{}] {}",
                    input.len(),
                    String::from_utf8_lossy(segment.nametag),
                    preview(&input)
                );
            }

            let processed = process_segment(file_id, &input, &self.policy, reflow)?;
            output.extend_from_slice(&processed);
            output.extend_from_slice(segment.terminator.as_bytes());

            pointer = segment.end;
        }
        output.extend_from_slice(&data[pointer..]);

        check_file_length(file_id, &output, data.len())?;
        Ok(output)
    }
}

fn check_file_length(file_id: &str, produced: &[u8], original: usize) -> Result<(), ScriptError> {
    if produced.len() != original {
        return Err(ScriptError::FileLengthMismatch {
            file: file_id.to_string(),
            produced: produced.len(),
            original,
        });
    }
    Ok(())
}
