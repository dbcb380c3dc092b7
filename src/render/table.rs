use crate::report::Table;

/// Render a table in psql style, the same layout `report::table` parses.
///
/// Columns whose cells are all plain numbers are right-aligned; everything
/// else is left-aligned.
pub fn render_psql(table: &Table) -> String {
    let cells: Vec<Vec<&str>> = table
        .rows
        .iter()
        .map(|row| {
            table
                .columns
                .iter()
                .map(|c| row.get(c).unwrap_or(""))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let numeric: Vec<bool> = (0..table.columns.len())
        .map(|i| !cells.is_empty() && cells.iter().all(|r| r[i].parse::<f64>().is_ok()))
        .collect();

    let rule = |left: char, mid: char, right: char| {
        let parts: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
        format!("{}{}{}", left, parts.join(&mid.to_string()), right)
    };
    let line = |values: &[&str]| {
        let parts: Vec<String> = values
            .iter()
            .zip(&widths)
            .zip(&numeric)
            .map(|((v, w), num)| {
                if *num {
                    format!(" {:>w$} ", v, w = *w)
                } else {
                    format!(" {:<w$} ", v, w = *w)
                }
            })
            .collect();
        format!("|{}|", parts.join("|"))
    };

    let header: Vec<&str> = table.columns.iter().map(String::as_str).collect();
    let mut out = vec![rule('+', '+', '+'), line(header.as_slice()), rule('|', '+', '|')];
    out.extend(cells.iter().map(|r| line(r.as_slice())));
    out.push(rule('+', '+', '+'));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::table::parse_table;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_psql_layout() {
        let table = parse_table(["| | Count | Geomean |", "| Instcount | 42 | -12.34% |"]);
        let expected = "\
+-----------+-------+---------+
| Metric    | Count | Geomean |
|-----------+-------+---------|
| Instcount |    42 | -12.34% |
+-----------+-------+---------+";
        assert_eq!(render_psql(&table), expected);
    }

    #[test]
    fn rendered_table_parses_back() {
        let table = parse_table([
            "| | Count | % of total | Geomean |",
            "| Instcount | 3 | 60.00% | -1.20% |",
            "| Size.text | 12 | 5.00% | 0.00% |",
        ]);
        let text = render_psql(&table);
        assert_eq!(parse_table(text.lines()), table);
    }
}
