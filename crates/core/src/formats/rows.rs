/// Split one quoted, comma-delimited row into its three fields.
///
/// The delimiter is the exact sequence `","` — a comma enclosed by quotes —
/// never a bare comma, because method signatures legitimately contain
/// commas between parameter types. One leading quote is stripped from the
/// first field and one trailing quote from the last. Returns `None` unless
/// the line has exactly three fields.
pub(crate) fn split_quoted_row(line: &str) -> Option<[&str; 3]> {
    let mut fields = line.split("\",\"");
    let first = fields.next()?;
    let second = fields.next()?;
    let third = fields.next()?;
    if fields.next().is_some() {
        return None;
    }
    Some([
        first.strip_prefix('"').unwrap_or(first),
        second,
        third.strip_suffix('"').unwrap_or(third),
    ])
}
