//! Longest-common-prefix completion.

/// Length of the common prefix of `a` and `b`, in bytes.
pub fn common_prefix_len(a: &str, b: &str) -> usize {
    a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count()
}

/// Text to append so that `partial` grows to the longest prefix shared by
/// every candidate starting with it.
///
/// Returns `None` when nothing matches or the candidates agree on nothing
/// beyond `partial` itself.
///
/// ```rust
/// use paramshell::system::completion::complete;
///
/// let names = ["alpha", "alphabeta", "gamma"];
/// assert_eq!(complete("al", names.iter().copied()), Some("pha"));
/// assert_eq!(complete("alpha", names.iter().copied()), None);
/// assert_eq!(complete("g", names.iter().copied()), Some("amma"));
/// ```
pub fn complete<'n>(partial: &str, names: impl Iterator<Item = &'n str>) -> Option<&'n str> {
    let mut matches = names.filter(|name| name.starts_with(partial));
    let first = matches.next()?;
    let common = matches.fold(first.len(), |common, other| {
        common.min(common_prefix_len(first, other))
    });

    if common > partial.len() && first.is_char_boundary(common) {
        Some(&first[partial.len()..common])
    } else {
        None
    }
}
