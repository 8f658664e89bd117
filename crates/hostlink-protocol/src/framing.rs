//! Brace-balanced framing over an unbounded byte stream.
//!
//! The decoder owns the bytes received so far on one connection. Complete
//! top-level objects are removed from the front of the buffer as they are
//! found; a trailing partial object stays in place until more bytes arrive.

/// Returns the length of the first complete top-level JSON object in `bytes`.
///
/// The scan tracks brace depth and whether it is inside a quoted string.
/// Braces inside strings are ignored, as is a quote preceded by an unescaped
/// backslash. The returned length ends at the brace that brings the depth
/// back to zero. A closing brace seen at depth zero never drives the depth
/// negative, so stray bytes before an object travel with that object.
///
/// Returns `None` when no object has been closed yet.
#[must_use]
pub fn find_frame_end(bytes: &[u8]) -> Option<usize> {
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, byte) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if *byte == b'\\' {
                escaped = true;
            } else if *byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return Some(index + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Growable receive buffer that yields complete frames.
#[derive(Debug, Default, Clone)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    /// Creates an empty decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Creates an empty decoder with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Appends freshly received bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Removes and returns the next complete frame, if one is buffered.
    ///
    /// Scanning always restarts at the front of the buffer, so several
    /// concatenated objects delivered by one read come out in order across
    /// successive calls.
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        let end = find_frame_end(&self.buffer)?;
        Some(self.buffer.drain(..end).collect())
    }

    /// Lazily drains every complete frame currently buffered.
    pub fn frames(&mut self) -> Frames<'_> {
        Frames { decoder: self }
    }

    /// Number of bytes buffered but not yet framed.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` when nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Borrows the unframed bytes.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Discards any buffered partial data.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Iterator returned by [`FrameDecoder::frames`].
#[derive(Debug)]
pub struct Frames<'a> {
    decoder: &'a mut FrameDecoder,
}

impl Iterator for Frames<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decoder.next_frame()
    }
}
