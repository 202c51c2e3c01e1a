//! Purpose: Render selected records as a bordered text table.
//! Exports: `render_records`, `selected_line`.
//! Role: Human output shared by the CLI subcommands and the interactive shell.
//! Invariants: Column widths are measured in characters, not bytes.
//! Invariants: Output never ends with a newline; callers decide line termination.
use crate::core::record::Record;

const CORNER: char = '+';
const EDGE: char = '=';
const SEPARATOR: char = '|';

pub fn selected_line(count: usize) -> String {
    format!("Records selected: {count}")
}

/// Renders `records` in the given order; an empty slice renders only the count line.
pub fn render_records(records: &[&Record]) -> String {
    let Some(first) = records.first() else {
        return selected_line(0);
    };

    let mut widths = vec![0; first.values().len()];
    for record in records {
        for (width, value) in widths.iter_mut().zip(record.values()) {
            *width = (*width).max(value.chars().count());
        }
    }

    let border = format_border(&widths);
    let mut lines = Vec::with_capacity(records.len() + 3);
    lines.push(border.clone());
    for record in records {
        lines.push(format_row(record.values(), &widths));
    }
    lines.push(border);
    lines.push(selected_line(records.len()));
    lines.join("\n")
}

fn format_border(widths: &[usize]) -> String {
    let mut line = String::new();
    line.push(CORNER);
    for width in widths {
        line.extend(std::iter::repeat_n(EDGE, width + 2));
        line.push(CORNER);
    }
    line
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    line.push(SEPARATOR);
    for (value, width) in values.iter().zip(widths) {
        line.push(' ');
        line.push_str(value);
        let len = value.chars().count();
        if *width > len {
            line.push_str(&" ".repeat(width - len));
        }
        line.push(' ');
        line.push(SEPARATOR);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::render_records;
    use crate::core::record::Record;

    fn record(values: &[&str]) -> Record {
        Record::new(values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn empty_selection_renders_only_the_count() {
        assert_eq!(render_records(&[]), "Records selected: 0");
    }

    #[test]
    fn columns_pad_to_the_widest_value() {
        let a = record(&["0000000003", "Bosnić", "Andrea", "4"]);
        let b = record(&["0000000004", "Božić", "Marin", "5"]);
        let output = render_records(&[&a, &b]);
        let expected = [
            "+============+========+========+===+",
            "| 0000000003 | Bosnić | Andrea | 4 |",
            "| 0000000004 | Božić  | Marin  | 5 |",
            "+============+========+========+===+",
            "Records selected: 2",
        ]
        .join("\n");
        assert_eq!(output, expected);
    }

    #[test]
    fn single_record_table() {
        let a = record(&["0000000001", "Akšamović", "Marin", "2"]);
        let output = render_records(&[&a]);
        let lines = output.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "| 0000000001 | Akšamović | Marin | 2 |");
        assert_eq!(lines[0].chars().count(), lines[1].chars().count());
        assert_eq!(lines[3], "Records selected: 1");
    }
}
