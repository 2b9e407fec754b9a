//! Plain-text rendering of analysis results for stdout.

/// Formats rows of numbers as whitespace separated columns under a `#` header line.
pub fn columns(headers: &[&str], rows: impl IntoIterator<Item = Vec<f64>>) -> String {
    let mut out = format!("# {}\n", headers.join(" "));
    for row in rows {
        let line: Vec<String> = row.iter().map(|v| format_number(*v)).collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

/// Formats a 3-vector as `x y z`.
pub fn triple(values: [f64; 3]) -> String {
    values.map(format_number).join(" ")
}

fn format_number(value: f64) -> String {
    format!("{value:.6}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_writes_header_and_rows() {
        let table = columns(&["r", "g(r)"], vec![vec![0.5, 1.0], vec![1.5, 0.25]]);
        assert_eq!(
            table,
            "# r g(r)\n0.500000 1.000000\n1.500000 0.250000\n"
        );
    }

    #[test]
    fn triple_is_space_separated() {
        assert_eq!(triple([1.0, -2.0, 0.5]), "1.000000 -2.000000 0.500000");
    }
}
