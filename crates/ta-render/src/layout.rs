/// Pad or truncate `content` to exactly `rows` lines.
///
/// Missing lines are appended empty, extra lines are dropped. Lines are
/// joined with `\n` without a trailing newline; `rows == 0` yields an empty
/// string.
///
/// # Example
/// ```
/// use ta_render::layout::fit_to_height;
/// assert_eq!(fit_to_height("a\nb", 4), "a\nb\n\n");
/// assert_eq!(fit_to_height("a\nb\nc", 2), "a\nb");
/// ```
#[must_use]
pub fn fit_to_height(content: &str, rows: u16) -> String {
    let rows = usize::from(rows);
    let mut lines: Vec<&str> = content.lines().take(rows).collect();
    lines.resize(rows, "");
    lines.join("\n")
}
