/*!
 * Recursive-descent decoder for control blocks.
 *
 * A block is parsed into its options, with any nested block already
 * resolved inside the option text, and the number of source bytes it spans.
 * The span always counts source bytes, never resolved bytes: the length
 * difference is only reconciled once the whole segment is rebuilt.
 */

use log::{debug, warn};

use crate::errors::ScriptError;
use crate::script::markers::{
    is_gender_separator, preview, ControlCode, BLOCK_END, HEADER_LEN, OPTION_SEPARATOR,
};
use crate::script::policy::ResolutionPolicy;
use crate::script::resolver;

/// A parsed control block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlBlock {
    /// Code that opened the block
    pub code: ControlCode,
    /// Options in source order, nested blocks already resolved
    pub options: Vec<Vec<u8>>,
    /// Source bytes consumed, header and terminator included
    pub span: usize,
}

/// A resolved control block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Bytes that replace the block
    pub replacement: Vec<u8>,
    /// Source bytes the block spanned
    pub span: usize,
}

/// Parse the block starting at `buf[0]`, which must hold `code`'s marker
pub fn parse_block(
    code: ControlCode,
    buf: &[u8],
    policy: &ResolutionPolicy,
) -> Result<ControlBlock, ScriptError> {
    let size = buf.len();
    let mut pointer = HEADER_LEN;
    let mut options: Vec<Vec<u8>> = vec![Vec::new()];
    let mut terminated = false;

    while pointer < size {
        let rest = &buf[pointer..];

        if let Some(nested) = ControlCode::from_marker(rest) {
            let decoded = decode_block(nested, rest, policy)?;
            current_option(&mut options).extend_from_slice(&decoded.replacement);
            pointer += decoded.span;
        } else if code.is_gender() && is_gender_separator(rest) {
            // each gender branch opens with its own 7-byte header
            options.push(Vec::new());
            pointer += HEADER_LEN;
        } else if !code.is_gender() && rest.starts_with(OPTION_SEPARATOR) {
            options.push(Vec::new());
            pointer += OPTION_SEPARATOR.len();
        } else if rest.starts_with(BLOCK_END) {
            pointer += BLOCK_END.len();
            // %A...%Z%B...%Z%C...%Z chains into a single decision
            let chained = code.is_gender() && is_gender_separator(buf.get(pointer..).unwrap_or_default());
            if !chained {
                terminated = true;
                break;
            }
        } else {
            current_option(&mut options).push(rest[0]);
            pointer += 1;
        }
    }

    let span = pointer.min(size);
    if !terminated {
        warn!(
            "Control block {} is not terminated, consuming to end of segment: {}",
            code,
            preview(&buf[..span])
        );
    }

    Ok(ControlBlock {
        code,
        options,
        span,
    })
}

/// Parse and resolve the block starting at `buf[0]`
pub fn decode_block(
    code: ControlCode,
    buf: &[u8],
    policy: &ResolutionPolicy,
) -> Result<Decoded, ScriptError> {
    let block = parse_block(code, buf, policy)?;
    let replacement = resolver::resolve(block.code, &block.options, policy)?;

    debug!("Found control block: {}", preview(&buf[..block.span]));
    debug!("Options: {:?}", block.options.iter().map(|o| preview(o)).collect::<Vec<_>>());
    debug!("Reduced control block: {}", preview(&replacement));

    Ok(Decoded {
        replacement,
        span: block.span,
    })
}

/// Resolve every control block in a segment, copying other bytes unchanged
pub fn decode_segment(segment: &[u8], policy: &ResolutionPolicy) -> Result<Vec<u8>, ScriptError> {
    let mut processed = Vec::with_capacity(segment.len());
    let mut pointer = 0;

    while pointer < segment.len() {
        let rest = &segment[pointer..];
        match ControlCode::from_marker(rest) {
            Some(code) => {
                let decoded = decode_block(code, rest, policy)?;
                processed.extend_from_slice(&decoded.replacement);
                pointer += decoded.span;
            }
            None => {
                processed.push(rest[0]);
                pointer += 1;
            }
        }
    }

    Ok(processed)
}

fn current_option(options: &mut [Vec<u8>]) -> &mut Vec<u8> {
    let last = options.len() - 1;
    &mut options[last]
}
