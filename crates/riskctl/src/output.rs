use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};

#[derive(clap::Args, Clone, Debug, Default)]
pub struct Output {
    /// How to format CLI output
    #[clap(global = true, short, long, value_enum)]
    pub output: Option<OutputType>,
}

#[derive(clap::ValueEnum, Debug, Copy, Clone, PartialEq)]
pub enum OutputType {
    /// Format output as compact JSON with items separated by newlines
    Json,
    /// Format output as YAML
    Yaml,
    /// Format the output as a pretty-printed table
    Table,
}

/// Things which riskctl prints as JSON, YAML, or a table row.
/// JSON and YAML come from `Serialize`.
pub trait CliOutput: Serialize {
    /// Cells of a table row: a `String`, a `JsonCell`, or a styled `comfy_table::Cell`.
    type CellValue: Into<comfy_table::Cell>;

    fn table_headers() -> Vec<&'static str>;

    /// Cells must be in the order of `table_headers`.
    fn into_table_row(self) -> Vec<Self::CellValue>;
}

pub fn print_yaml(items: impl IntoIterator<Item = impl Serialize>) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    for item in items {
        serde_yaml::to_writer(&mut stdout, &item)?;
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

pub fn print_json(items: impl IntoIterator<Item = impl Serialize>) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    for item in items {
        serde_json::to_writer(&mut stdout, &item)?;
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

pub fn print_table<T: CliOutput>(items: impl IntoIterator<Item = T>) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    let mut table = crate::new_table(T::table_headers());

    for item in items {
        table.add_row(item.into_table_row());
    }

    for line in table.lines() {
        stdout.write_all(line.as_bytes())?;
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

/// Extract a table row from the JSON `pointers` of `value`.
pub fn to_table_row<T: Serialize>(value: T, pointers: &[&str]) -> Vec<JsonCell> {
    let mut json = serde_json::to_value(value).expect("failed to serialize json");

    let mut row = Vec::with_capacity(pointers.len());
    for column in pointers {
        let val = json.pointer_mut(column).map(Value::take);
        row.push(JsonCell(val));
    }
    row
}

/// A JSON value extracted for a table cell. An absent value is an empty cell.
pub struct JsonCell(pub Option<Value>);

impl From<JsonCell> for comfy_table::Cell {
    fn from(cell: JsonCell) -> Self {
        match cell.0 {
            None | Some(Value::Null) => comfy_table::Cell::new(String::new()),
            Some(Value::String(s)) => comfy_table::Cell::new(s),
            Some(other) => comfy_table::Cell::new(other),
        }
    }
}

/// Parse a `#rrggbb` color, as used by markers and routes, into a terminal color.
pub fn hex_color(hex: &str) -> Option<comfy_table::Color> {
    let hex = hex.strip_prefix('#').filter(|hex| hex.len() == 6)?;
    let channel = |at: usize| u8::from_str_radix(hex.get(at..at + 2)?, 16).ok();

    Some(comfy_table::Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

/// Draw `cell` in `color`. Colors which don't parse leave the cell unstyled.
pub fn colored(cell: comfy_table::Cell, color: &str) -> comfy_table::Cell {
    match hex_color(color) {
        Some(color) => cell.fg(color),
        None => cell,
    }
}
