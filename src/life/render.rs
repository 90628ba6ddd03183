/// Renders a row-major alive snapshot as text, one line per row
/// (`#` alive, `.` dead).
pub fn render_text(snapshot: &[bool], columns: usize) -> String {
    if columns == 0 {
        return String::new();
    }
    let mut out = String::with_capacity(snapshot.len() + snapshot.len() / columns);
    for row in snapshot.chunks(columns) {
        out.extend(row.iter().map(|&alive| if alive { '#' } else { '.' }));
        out.push('\n');
    }
    out
}
