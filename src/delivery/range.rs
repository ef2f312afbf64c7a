/// Outcome of interpreting a `Range` header against an object of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// No `Range` header; deliver everything.
    Full,
    /// Inclusive byte span, already clamped to the object.
    Partial { start: u64, end: u64 },
    /// Header present but outside the supported single-range grammar, or
    /// starting past the end of the object.
    Unsatisfiable,
}

impl ByteRange {
    /// Interpret `header` for an object of `size` bytes.
    ///
    /// Accepts `bytes=<start>-<end>`, `bytes=<start>-` and `bytes=-<suffix>`.
    pub fn parse(header: Option<&str>, size: u64) -> Self {
        match header {
            None => ByteRange::Full,
            Some(value) => parse_single(value, size)
                .map(|(start, end)| ByteRange::Partial { start, end })
                .unwrap_or(ByteRange::Unsatisfiable),
        }
    }
}

fn parse_single(value: &str, size: u64) -> Option<(u64, u64)> {
    let spec = value.strip_prefix("bytes=")?;
    let (first, last) = spec.split_once('-')?;
    if last.contains('-') {
        return None;
    }

    let (start, end) = if first.is_empty() {
        if last.is_empty() {
            return None;
        }
        let suffix: u64 = last.parse().ok()?;
        (size.saturating_sub(suffix), size.checked_sub(1)?)
    } else {
        let start: u64 = first.parse().ok()?;
        let end = if last.is_empty() {
            size.checked_sub(1)?
        } else {
            let end: u64 = last.parse().ok()?;
            if end < start {
                return None;
            }
            end
        };
        (start, end)
    };

    if start >= size {
        return None;
    }
    Some((start, end.min(size - 1)))
}
